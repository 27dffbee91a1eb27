//! Axis resolution: turn an axis's raw rows into one ordered value set.

use std::collections::HashSet;

use tracing::{debug, warn};

use xyzplot_core::axis::Axis;
use xyzplot_core::fields::{FieldCatalog, FieldKind};
use xyzplot_core::value::ParsedValue;

use crate::expr::parse_expression;
use crate::types::{ResolvedAxis, Warning};

/// Resolve an axis against the field catalog.
///
/// Enumerated-choice fields take their selected tokens verbatim; every other
/// field parses each expression row. The result keeps the first occurrence of
/// each value in input order.
pub fn resolve(axis: &Axis, catalog: &FieldCatalog) -> ResolvedAxis {
    let field = axis.field.trim();
    let kind = catalog.classify(field);
    let mut resolved = ResolvedAxis::empty(axis.id, field, kind);
    if !axis.has_field() {
        return resolved;
    }

    let mut candidates = Vec::new();
    match kind {
        FieldKind::EnumeratedChoice => {
            let known = catalog.choices_for(field).unwrap_or_default();
            for token in axis.choices.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
                if !known.is_empty() && !known.iter().any(|k| k == token) {
                    resolved.warnings.push(Warning::UnknownChoice {
                        axis: axis.id,
                        field: field.to_string(),
                        choice: token.to_string(),
                    });
                }
                candidates.push(ParsedValue::Text(token.to_string()));
            }
        }
        FieldKind::PromptCollection => {
            for expr in &axis.expressions {
                // Keyframe objects contain commas; keep them whole.
                if expr.trim_start().starts_with('{') {
                    candidates.push(ParsedValue::Text(expr.trim().to_string()));
                } else {
                    parse_row(axis, expr, &mut candidates, &mut resolved.warnings);
                }
            }
        }
        _ => {
            for expr in &axis.expressions {
                parse_row(axis, expr, &mut candidates, &mut resolved.warnings);
            }
        }
    }

    resolved.values = dedup(candidates);
    for warning in &resolved.warnings {
        warn!("{}", warning);
    }
    debug!(
        axis = %axis.id,
        field,
        kind = %kind,
        count = resolved.values.len(),
        "resolved axis"
    );
    resolved
}

fn parse_row(
    axis: &Axis,
    expr: &str,
    candidates: &mut Vec<ParsedValue>,
    warnings: &mut Vec<Warning>,
) {
    let outcome = parse_expression(expr);
    if let Some(warning) = outcome.warning {
        warnings.push(Warning::Expression {
            axis: axis.id,
            warning,
        });
    }
    candidates.extend(outcome.values);
}

#[derive(PartialEq, Eq, Hash)]
enum DedupKey {
    Number(u64),
    Bool(bool),
    Text(String),
}

impl DedupKey {
    fn of(value: &ParsedValue) -> Self {
        match value {
            // -0 and 0 compare equal
            ParsedValue::Number(n) if *n == 0.0 => Self::Number(0.0f64.to_bits()),
            ParsedValue::Number(n) => Self::Number(n.to_bits()),
            ParsedValue::Bool(b) => Self::Bool(*b),
            ParsedValue::Text(s) => Self::Text(s.clone()),
        }
    }
}

/// Remove structural duplicates, keeping first-seen order.
pub fn dedup(values: Vec<ParsedValue>) -> Vec<ParsedValue> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(DedupKey::of(v)))
        .collect()
}
