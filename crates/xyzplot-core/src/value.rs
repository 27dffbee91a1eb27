//! Scalar values produced by parsing axis value expressions.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

/// Largest magnitude at which an integral `f64` is written as a JSON integer.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// One scalar axis value: a number, a boolean, or literal text.
///
/// Equality is structural, so `Number(1.0)` and `Text("1")` are distinct.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl ParsedValue {
    /// Classify a single trimmed token.
    ///
    /// `true`/`false` (any case) become booleans, anything that parses to a
    /// finite number becomes a number, and everything else is kept as text.
    pub fn classify(token: &str) -> Self {
        let token = token.trim();
        if token.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if token.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        match parse_finite(token) {
            Some(n) => Self::Number(n),
            None => Self::Text(token.to_string()),
        }
    }

    /// Returns the text payload, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Convert to a JSON value. Integral numbers are written as integers.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Number(n) => number_to_json(*n),
            Self::Bool(b) => Value::Bool(*b),
            Self::Text(s) => Value::String(s.clone()),
        }
    }

    /// Convert a JSON scalar back into a value. Objects, arrays and null
    /// have no scalar form and yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for ParsedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // -0 prints as 0
            Self::Number(n) if *n == 0.0 => f.write_str("0"),
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for ParsedValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for ParsedValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for ParsedValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for ParsedValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParsedValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl Serialize for ParsedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParsedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom("expected a number, boolean, or string"))
    }
}

/// Parse a token as a finite `f64`. Empty text, `inf` and `NaN` are rejected.
pub fn parse_finite(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    token.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Convert an `f64` into a JSON number, preferring the integer form.
pub fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}
