//! Filename options shared by the engine and the configuration layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What to do when two combinations render to the same filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Keep the names and report every duplicate.
    #[default]
    Warn,
    /// Rename later occurrences to `<stem>_2<ext>`, `<stem>_3<ext>`, ...
    Suffix,
}

impl DuplicatePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Suffix => "suffix",
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "suffix" => Ok(Self::Suffix),
            other => Err(format!(
                "invalid duplicate policy '{}': expected 'warn' or 'suffix'",
                other
            )),
        }
    }
}

/// Settings for the naming engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamingOptions {
    /// Filename template. `None` uses the template suggested for the active
    /// axes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Value of the `{filename}` placeholder.
    #[serde(default = "default_filename")]
    pub filename: String,

    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default)]
    pub on_duplicate: DuplicatePolicy,
}

impl Default for NamingOptions {
    fn default() -> Self {
        Self {
            template: None,
            filename: default_filename(),
            extension: default_extension(),
            on_duplicate: DuplicatePolicy::default(),
        }
    }
}

fn default_filename() -> String {
    "xyz_plot".to_string()
}

fn default_extension() -> String {
    ".txt".to_string()
}
