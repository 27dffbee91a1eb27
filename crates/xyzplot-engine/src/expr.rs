//! Value expression parser.
//!
//! An expression is one row of axis input. Forms are tried in this order and
//! the first match wins:
//!
//! | form | example | result |
//! |---|---|---|
//! | stepped range | `1-5 (+2)` | `1, 3, 5` |
//! | count range | `0-10 [5]` | `0, 2.5, 5, 7.5, 10` |
//! | integer range | `1-5` | `1, 2, 3, 4, 5` |
//! | comma list | `1, true, hello` | `1, true, "hello"` |
//! | single token | `euler_a` | `"euler_a"` |
//!
//! Malformed ranges never fail: they produce no values and an
//! [`ExprWarning`].

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use xyzplot_core::value::ParsedValue;

use crate::types::ExprWarning;

/// Upper bound on the number of values a single range may expand to.
pub const MAX_RANGE_VALUES: usize = 100_000;

/// Tolerance when checking whether a stepped range reaches its end value.
const EPSILON: f64 = 1e-9;

const NUM: &str = r"-?(?:\d+(?:\.\d*)?|\.\d+)";
const UNSIGNED: &str = r"(?:\d+(?:\.\d*)?|\.\d+)";

static STEPPED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^({NUM})\s*-\s*({NUM})\s*\(\s*\+?\s*(-?)\s*({UNSIGNED})\s*\)$"
    ))
    .unwrap()
});

/// Any `<start>-<end> (...)`, for reporting steps that are not numbers.
static STEPPED_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^({NUM})\s*-\s*({NUM})\s*\(.*\)$")).unwrap());

static COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^({NUM})\s*-\s*({NUM})\s*\[\s*(\d+)\s*\]$")).unwrap()
});

static INT_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d+)\s*-\s*(-?\d+)$").unwrap());

static DECIMAL_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^({NUM})\s*-\s*({NUM})$")).unwrap());

/// Values parsed from one expression and the warning, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionOutcome {
    pub values: Vec<ParsedValue>,
    pub warning: Option<ExprWarning>,
}

impl ExpressionOutcome {
    fn values(values: Vec<ParsedValue>) -> Self {
        Self {
            values,
            warning: None,
        }
    }

    fn warn(values: Vec<ParsedValue>, warning: ExprWarning) -> Self {
        Self {
            values,
            warning: Some(warning),
        }
    }
}

/// Parse one expression, returning its values and any warning.
pub fn parse_expression(expr: &str) -> ExpressionOutcome {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return ExpressionOutcome::values(Vec::new());
    }

    if let Some(caps) = STEPPED_RE.captures(trimmed) {
        let start = number(&caps[1]);
        let end = number(&caps[2]);
        let magnitude = number(&caps[4]);
        let step = if &caps[3] == "-" { -magnitude } else { magnitude };
        return stepped(trimmed, start, end, step);
    }

    if STEPPED_SHAPE_RE.is_match(trimmed) {
        return ExpressionOutcome::warn(
            Vec::new(),
            ExprWarning::InvalidStep {
                expr: trimmed.to_string(),
            },
        );
    }

    if let Some(caps) = COUNT_RE.captures(trimmed) {
        let start = number(&caps[1]);
        let end = number(&caps[2]);
        return match caps[3].parse::<usize>() {
            Ok(count) => counted(trimmed, start, end, count),
            Err(_) => too_many(trimmed),
        };
    }

    if let Some(caps) = INT_RANGE_RE.captures(trimmed) {
        return match (caps[1].parse::<i64>(), caps[2].parse::<i64>()) {
            (Ok(start), Ok(end)) => integers(trimmed, start, end),
            _ => too_many(trimmed),
        };
    }

    if DECIMAL_RANGE_RE.is_match(trimmed) {
        return ExpressionOutcome::warn(
            Vec::new(),
            ExprWarning::NonIntegerRange {
                expr: trimmed.to_string(),
            },
        );
    }

    if trimmed.contains(',') {
        let values = trimmed
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(ParsedValue::classify)
            .collect();
        return ExpressionOutcome::values(values);
    }

    ExpressionOutcome::values(vec![ParsedValue::classify(trimmed)])
}

/// Parse one expression, logging any warning.
pub fn parse(expr: &str) -> Vec<ParsedValue> {
    let outcome = parse_expression(expr);
    if let Some(warning) = &outcome.warning {
        warn!("{}", warning);
    }
    outcome.values
}

fn stepped(expr: &str, start: f64, end: f64, step: f64) -> ExpressionOutcome {
    if step == 0.0 {
        return ExpressionOutcome::warn(
            vec![num_value(start)],
            ExprWarning::ZeroStep {
                expr: expr.to_string(),
            },
        );
    }
    if start == end {
        return ExpressionOutcome::values(vec![num_value(start)]);
    }
    if (end - start).signum() != step.signum() {
        return ExpressionOutcome::warn(
            Vec::new(),
            ExprWarning::StepDirection {
                expr: expr.to_string(),
            },
        );
    }

    let steps = ((end - start) / step + EPSILON).floor();
    if !steps.is_finite() || steps >= MAX_RANGE_VALUES as f64 {
        return too_many(expr);
    }
    let count = steps as usize + 1;
    let values = (0..count)
        .map(|i| num_value(start + i as f64 * step))
        .collect();
    ExpressionOutcome::values(values)
}

fn counted(expr: &str, start: f64, end: f64, count: usize) -> ExpressionOutcome {
    match count {
        0 => ExpressionOutcome::values(Vec::new()),
        1 => ExpressionOutcome::values(vec![num_value(start)]),
        n if n > MAX_RANGE_VALUES => too_many(expr),
        n => {
            let step = (end - start) / (n - 1) as f64;
            let values = (0..n)
                .map(|i| num_value(start + i as f64 * step))
                .collect();
            ExpressionOutcome::values(values)
        }
    }
}

fn integers(expr: &str, start: i64, end: i64) -> ExpressionOutcome {
    if start > end {
        return ExpressionOutcome::warn(
            Vec::new(),
            ExprWarning::EmptyIntegerRange {
                expr: expr.to_string(),
            },
        );
    }
    if (end as i128 - start as i128) >= MAX_RANGE_VALUES as i128 {
        return too_many(expr);
    }
    let values = (start..=end)
        .map(|n| ParsedValue::Number(n as f64))
        .collect();
    ExpressionOutcome::values(values)
}

fn too_many(expr: &str) -> ExpressionOutcome {
    ExpressionOutcome::warn(
        Vec::new(),
        ExprWarning::TooManyValues {
            expr: expr.to_string(),
            limit: MAX_RANGE_VALUES,
        },
    )
}

// Captures come from NUM, which always parses.
fn number(text: &str) -> f64 {
    text.parse().unwrap_or(0.0)
}

fn num_value(n: f64) -> ParsedValue {
    ParsedValue::Number(round10(n))
}

/// Round to 10 decimal digits, normalizing `-0` to `0`.
fn round10(n: f64) -> f64 {
    let rounded = (n * 1e10).round() / 1e10;
    if rounded == 0.0 { 0.0 } else { rounded }
}
