//! `xyzplot name` -- preview the filename template.

use anyhow::{Context, Result};
use chrono::Local;
use serde_json::Map;

use xyzplot_core::settings::load_base;
use xyzplot_engine::naming::{preview, suggest_template, template_variables, unknown_placeholders};
use xyzplot_engine::{ResolvedAxis, resolve};

use crate::cli::NameArgs;
use crate::commands::axes::{apply_naming, build_axes};
use crate::context::RuntimeContext;
use crate::output::output_json;
use crate::styles::{ICON_WARN, render_bold, render_muted, render_warn};

/// Execute the `xyzplot name` command.
pub fn run(ctx: &RuntimeContext, args: &NameArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let settings = match &args.base {
        Some(path) => load_base(path)
            .with_context(|| format!("failed to load base settings {}", path.display()))?,
        None => Map::new(),
    };

    let mut naming = config.naming.clone();
    apply_naming(&args.naming, &mut naming)?;

    let axes = build_axes(&args.axes, &config.fields)?;
    let resolved: Vec<ResolvedAxis> = axes
        .iter()
        .filter(|a| a.has_field())
        .map(|a| resolve(a, &config.fields))
        .collect();

    let template = naming.template.clone().unwrap_or_else(|| {
        suggest_template(
            axes.x.has_field(),
            axes.y.has_field(),
            axes.z.as_ref().is_some_and(|z| z.has_field()),
        )
    });
    let name = preview(&template, &resolved, &settings, &naming, Local::now());
    let variables = template_variables(&template);
    let unknown = unknown_placeholders(&template);

    if ctx.json {
        output_json(&serde_json::json!({
            "template": template,
            "preview": name,
            "variables": variables,
            "unknown": unknown,
        }));
        return Ok(());
    }

    if ctx.quiet {
        println!("{}", name);
        return Ok(());
    }

    println!("{} {}", render_bold("Template:"), template);
    println!("{} {}", render_bold("Preview: "), name);
    println!(
        "{}",
        render_muted(&format!("Variables: {}", variables.join(", ")))
    );
    for placeholder in &unknown {
        eprintln!(
            "{} unknown placeholder {{{}}} is kept as written",
            render_warn(ICON_WARN),
            placeholder
        );
    }
    Ok(())
}
