//! Turning axis and naming flags into engine inputs.

use anyhow::{Result, anyhow};

use xyzplot_core::axis::{Axis, AxisId, PromptMode};
use xyzplot_core::fields::{FieldCatalog, FieldKind};
use xyzplot_core::naming::NamingOptions;

use crate::cli::{AxisArgs, NamingArgs};

/// The X, Y and optional Z selections from the command line.
#[derive(Debug, Clone)]
pub struct AxisSet {
    pub x: Axis,
    pub y: Axis,
    pub z: Option<Axis>,
}

impl AxisSet {
    pub fn iter(&self) -> impl Iterator<Item = &Axis> {
        [&self.x, &self.y].into_iter().chain(self.z.as_ref())
    }
}

/// Build the axis selections. A missing `--x`/`--y` yields an axis with no
/// field so the generator reports it.
pub fn build_axes(args: &AxisArgs, catalog: &FieldCatalog) -> Result<AxisSet> {
    let x = build_axis(
        AxisId::X,
        args.x.as_deref(),
        &args.x_values,
        &args.x_choice,
        args.x_prompt_mode.as_deref(),
        catalog,
    )?;
    let y = build_axis(
        AxisId::Y,
        args.y.as_deref(),
        &args.y_values,
        &args.y_choice,
        args.y_prompt_mode.as_deref(),
        catalog,
    )?;
    let z = match args.z.as_deref() {
        Some(field) => Some(build_axis(
            AxisId::Z,
            Some(field),
            &args.z_values,
            &args.z_choice,
            args.z_prompt_mode.as_deref(),
            catalog,
        )?),
        None => None,
    };
    Ok(AxisSet { x, y, z })
}

fn build_axis(
    id: AxisId,
    field: Option<&str>,
    values: &[String],
    choices: &[String],
    prompt_mode: Option<&str>,
    catalog: &FieldCatalog,
) -> Result<Axis> {
    let field = field.unwrap_or_default().trim();
    let mut axis = Axis::new(id, field);
    for expr in values {
        axis = axis.expression(expr.clone());
    }
    for token in choices {
        axis = axis.choice(token.clone());
    }

    // Choice fields given through --*-values take the comma-separated tokens.
    if choices.is_empty() && !field.is_empty() && catalog.classify(field) == FieldKind::EnumeratedChoice
    {
        for token in values.iter().flat_map(|v| v.split(',')) {
            let token = token.trim();
            if !token.is_empty() {
                axis = axis.choice(token);
            }
        }
    }

    if let Some(mode) = prompt_mode {
        let mode: PromptMode = mode
            .parse()
            .map_err(|e: String| anyhow!("{}: {}", id, e))?;
        axis = axis.prompt_mode(mode);
    }
    Ok(axis)
}

/// Apply naming flags over the configured options.
pub fn apply_naming(args: &NamingArgs, options: &mut NamingOptions) -> Result<()> {
    if let Some(template) = &args.template {
        if template.contains('/') || template.contains('\\') {
            return Err(anyhow!("templates cannot contain path separators"));
        }
        options.template = Some(template.clone());
    }
    if let Some(filename) = &args.filename {
        options.filename = filename.clone();
    }
    if let Some(ext) = &args.extension {
        options.extension = if ext.is_empty() || ext.starts_with('.') {
            ext.clone()
        } else {
            format!(".{}", ext)
        };
    }
    if let Some(policy) = &args.on_duplicate {
        options.on_duplicate = policy.parse().map_err(|e: String| anyhow!(e))?;
    }
    Ok(())
}
