//! Axis selections: which field an axis varies and the raw value rows for it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identity of one sweep dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisId {
    X,
    Y,
    Z,
}

impl AxisId {
    /// All axes in declaration order.
    pub const ALL: [AxisId; 3] = [AxisId::X, AxisId::Y, AxisId::Z];

    /// Lowercase letter used for template variables (`x` in `{x_value}`).
    pub fn letter(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }

    /// Key used in the provenance block (`x_axis`).
    pub fn meta_key(self) -> &'static str {
        match self {
            Self::X => "x_axis",
            Self::Y => "y_axis",
            Self::Z => "z_axis",
        }
    }
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("X-Axis"),
            Self::Y => f.write_str("Y-Axis"),
            Self::Z => f.write_str("Z-Axis"),
        }
    }
}

/// How an axis value is merged into the prompt keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    /// Append `, <value>` to every keyframe.
    #[default]
    Append,
    /// Replace the whole keyframe mapping.
    Override,
}

impl PromptMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Override => "override",
        }
    }
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "override" => Ok(Self::Override),
            other => Err(format!(
                "invalid prompt mode '{}': expected 'append' or 'override'",
                other
            )),
        }
    }
}

/// One axis as selected by the user.
///
/// `field` may be a dotted path into the settings document; an empty field
/// marks the axis as inactive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub id: AxisId,

    #[serde(default)]
    pub field: String,

    /// Only meaningful for Z; X and Y are always part of a generation.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Raw value expressions, one per input row.
    #[serde(default)]
    pub expressions: Vec<String>,

    /// Selected tokens for enumerated-choice fields.
    #[serde(default)]
    pub choices: Vec<String>,

    #[serde(default)]
    pub prompt_mode: PromptMode,
}

fn default_enabled() -> bool {
    true
}

impl Axis {
    /// Create an enabled axis varying `field` with no values yet.
    pub fn new(id: AxisId, field: impl Into<String>) -> Self {
        Self {
            id,
            field: field.into(),
            enabled: true,
            expressions: Vec::new(),
            choices: Vec::new(),
            prompt_mode: PromptMode::default(),
        }
    }

    /// Add one value-expression row.
    pub fn expression(mut self, expr: impl Into<String>) -> Self {
        self.expressions.push(expr.into());
        self
    }

    /// Add one selected choice token.
    pub fn choice(mut self, token: impl Into<String>) -> Self {
        self.choices.push(token.into());
        self
    }

    pub fn prompt_mode(mut self, mode: PromptMode) -> Self {
        self.prompt_mode = mode;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns `true` if a field has been selected.
    pub fn has_field(&self) -> bool {
        !self.field.trim().is_empty()
    }
}
