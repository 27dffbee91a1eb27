//! Shared overrides applied to every generated document.
//!
//! These come from form-style text input, so values arrive as raw strings and
//! are coerced here before being merged into the base.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use xyzplot_core::fields::{FieldCatalog, FieldKind};
use xyzplot_core::settings::BaseConfiguration;
use xyzplot_core::value::{ParsedValue, parse_finite};

static KEYFRAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+\s*:\s*\(").unwrap());

/// Camera motion model; decides which motion fields are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationMode {
    #[default]
    TwoD,
    ThreeD,
}

impl AnimationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TwoD => "2D",
            Self::ThreeD => "3D",
        }
    }

    /// Motion fields for this mode and their defaults.
    pub fn motion_fields(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::TwoD => &[
                ("zoom", "0: (1.04)"),
                ("translation_x", "0: (0)"),
                ("translation_y", "0: (0)"),
                ("rotation_2d", "0: (0)"),
            ],
            Self::ThreeD => &[
                ("translation_x", "0: (0)"),
                ("translation_y", "0: (0)"),
                ("translation_z", "0: (1.75)"),
                ("rotation_3d_x", "0: (0)"),
                ("rotation_3d_y", "0: (0)"),
                ("rotation_3d_z", "0: (0)"),
            ],
        }
    }
}

impl fmt::Display for AnimationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "2D" => Ok(Self::TwoD),
            "3D" => Ok(Self::ThreeD),
            other => Err(format!(
                "invalid animation mode '{}': expected '2D' or '3D'",
                other
            )),
        }
    }
}

/// Builds the flat map of shared overrides.
pub struct CommonOverridesBuilder<'a> {
    catalog: &'a FieldCatalog,
    overrides: Map<String, Value>,
}

impl<'a> CommonOverridesBuilder<'a> {
    pub fn new(catalog: &'a FieldCatalog) -> Self {
        Self {
            catalog,
            overrides: Map::new(),
        }
    }

    /// Set one field from raw text. Blank input is ignored.
    ///
    /// `cfg_scale_schedule` is stored as `cfg_scale`. Schedule fields get
    /// bare scalars wrapped as `0: (<value>)`.
    pub fn set(mut self, field: &str, raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return self;
        }
        let field = match field.trim() {
            "cfg_scale_schedule" => "cfg_scale",
            other => other,
        };
        let value = match self.catalog.classify(field) {
            FieldKind::Schedule => Value::String(wrap_schedule(raw)),
            _ => coerce(raw),
        };
        self.overrides.insert(field.to_string(), value);
        self
    }

    /// Record the animation mode and its motion fields, each taken from the
    /// base or defaulted.
    pub fn animation_mode(mut self, mode: AnimationMode, base: &BaseConfiguration) -> Self {
        self.overrides
            .insert("animation_mode".to_string(), Value::String(mode.to_string()));
        for (field, default) in mode.motion_fields() {
            if self.overrides.contains_key(*field) {
                continue;
            }
            let value = base
                .get(*field)
                .filter(|v| !is_blank(v))
                .cloned()
                .unwrap_or_else(|| Value::String(default.to_string()));
            self.overrides.insert(field.to_string(), value);
        }
        self
    }

    pub fn build(self) -> Map<String, Value> {
        self.overrides
    }
}

/// Coerce raw text to a number only when it is the number's canonical text
/// (`"7"` becomes 7, `"7.50"` stays text).
pub fn coerce(raw: &str) -> Value {
    match parse_finite(raw) {
        Some(n) if ParsedValue::Number(n).to_string() == raw => ParsedValue::Number(n).to_json(),
        _ => Value::String(raw.to_string()),
    }
}

/// Returns `true` if `text` already starts with a `frame: (` keyframe.
pub fn is_keyframe_string(text: &str) -> bool {
    KEYFRAME_RE.is_match(text.trim_start())
}

/// Wrap a bare scalar as a single keyframe at frame 0.
pub fn wrap_schedule(raw: &str) -> String {
    let raw = raw.trim();
    if is_keyframe_string(raw) {
        raw.to_string()
    } else {
        format!("0: ({})", raw)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
