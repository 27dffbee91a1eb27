//! `xyzplot parse` -- show what value expressions expand to.

use anyhow::Result;
use serde_json::Value;

use xyzplot_core::axis::{Axis, AxisId};
use xyzplot_core::fields::FieldCatalog;
use xyzplot_core::value::ParsedValue;
use xyzplot_engine::{parse_expression, resolve};

use crate::cli::ParseArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table, print_warnings};

/// Execute the `xyzplot parse` command.
pub fn run(ctx: &RuntimeContext, args: &ParseArgs) -> Result<()> {
    match &args.field {
        Some(field) => {
            let config = ctx.load_config()?;
            run_resolve(ctx, field, &args.expressions, &config.fields)
        }
        None => {
            run_expressions(ctx, &args.expressions);
            Ok(())
        }
    }
}

fn run_expressions(ctx: &RuntimeContext, expressions: &[String]) {
    let outcomes: Vec<_> = expressions
        .iter()
        .map(|expr| (expr, parse_expression(expr)))
        .collect();

    if ctx.json {
        let items: Vec<Value> = outcomes
            .iter()
            .map(|(expr, outcome)| {
                serde_json::json!({
                    "expression": expr,
                    "values": outcome.values,
                    "warning": outcome.warning.as_ref().map(|w| w.to_string()),
                })
            })
            .collect();
        output_json(&items);
        return;
    }

    let rows: Vec<Vec<String>> = outcomes
        .iter()
        .map(|(expr, outcome)| {
            vec![
                expr.to_string(),
                outcome.values.len().to_string(),
                join_values(&outcome.values),
                outcome
                    .warning
                    .as_ref()
                    .map(|w| w.to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    output_table(&["EXPRESSION", "COUNT", "VALUES", "WARNING"], &rows);
}

/// Resolve all expressions as the rows of one axis: deduplicated, with
/// choice and prompt handling for the field's kind.
fn run_resolve(
    ctx: &RuntimeContext,
    field: &str,
    expressions: &[String],
    catalog: &FieldCatalog,
) -> Result<()> {
    let mut axis = Axis::new(AxisId::X, field);
    for expr in expressions {
        axis = axis.expression(expr.clone());
        for token in expr.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            axis = axis.choice(token);
        }
    }
    let resolved = resolve(&axis, catalog);

    if ctx.json {
        output_json(&serde_json::json!({
            "field": resolved.field,
            "kind": resolved.kind.as_str(),
            "values": resolved.values,
            "warnings": resolved.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    if !ctx.quiet {
        print_warnings(&resolved.warnings);
    }
    println!(
        "{} ({}): {} values",
        resolved.field,
        resolved.kind,
        resolved.len()
    );
    for value in &resolved.values {
        println!("  {}", value);
    }
    Ok(())
}

fn join_values(values: &[ParsedValue]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
