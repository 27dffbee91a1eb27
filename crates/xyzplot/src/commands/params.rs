//! `xyzplot params` -- list the fields an axis can vary.

use anyhow::{Context, Result, bail};

use xyzplot_core::fields::FieldKind;
use xyzplot_core::settings::{ParameterInfo, list_parameters, load_base};

use crate::cli::ParamsArgs;
use crate::context::RuntimeContext;
use crate::output::{display_value, output_json, output_table};

const KINDS: [FieldKind; 5] = [
    FieldKind::Boolean,
    FieldKind::EnumeratedChoice,
    FieldKind::PromptCollection,
    FieldKind::Schedule,
    FieldKind::Numeric,
];

/// Execute the `xyzplot params` command.
pub fn run(ctx: &RuntimeContext, args: &ParamsArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let base = load_base(&args.base)
        .with_context(|| format!("failed to load base settings {}", args.base.display()))?;

    let kind = args.kind.as_deref().map(parse_kind).transpose()?;
    let params: Vec<ParameterInfo> = list_parameters(&base, &config.fields)
        .into_iter()
        .filter(|p| kind.is_none_or(|k| p.kind == k))
        .collect();

    if ctx.json {
        output_json(&params);
        return Ok(());
    }

    if params.is_empty() {
        if !ctx.quiet {
            println!("No parameters found.");
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = params
        .iter()
        .map(|p| {
            vec![
                p.name.clone(),
                p.kind.to_string(),
                p.current.as_ref().map(display_value).unwrap_or_default(),
            ]
        })
        .collect();
    output_table(&["NAME", "KIND", "CURRENT"], &rows);
    Ok(())
}

fn parse_kind(raw: &str) -> Result<FieldKind> {
    let raw = raw.trim().to_ascii_lowercase();
    match KINDS.into_iter().find(|k| k.as_str() == raw) {
        Some(kind) => Ok(kind),
        None => bail!(
            "unknown field kind '{}': expected one of {}",
            raw,
            KINDS.map(|k| k.as_str()).join(", ")
        ),
    }
}
