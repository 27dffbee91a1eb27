//! Field classification.
//!
//! Every settings field an axis can target falls into one [`FieldKind`]. The
//! [`FieldCatalog`] holds the name lists that drive the classification and is
//! loaded from the project configuration, so new schedule or choice fields can
//! be declared without code changes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed classification of a settings field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Boolean,
    EnumeratedChoice,
    PromptCollection,
    Schedule,
    Numeric,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::EnumeratedChoice => "choice",
            Self::PromptCollection => "prompts",
            Self::Schedule => "schedule",
            Self::Numeric => "numeric",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of the init-image flag and the fields that only make sense when it
/// is on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitImageFields {
    #[serde(default = "default_init_flag")]
    pub flag: String,

    #[serde(default = "default_init_path")]
    pub path: String,

    #[serde(default = "default_init_strength")]
    pub strength: String,
}

impl Default for InitImageFields {
    fn default() -> Self {
        Self {
            flag: default_init_flag(),
            path: default_init_path(),
            strength: default_init_strength(),
        }
    }
}

impl InitImageFields {
    /// Fields removed from a document when the flag is off.
    pub fn dependents(&self) -> [&str; 2] {
        [self.path.as_str(), self.strength.as_str()]
    }
}

fn default_init_flag() -> String {
    "use_init".to_string()
}

fn default_init_path() -> String {
    "init_image".to_string()
}

fn default_init_strength() -> String {
    "strength".to_string()
}

/// Name lists used to classify fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCatalog {
    /// The dedicated prompt keyframe field.
    #[serde(default = "default_prompts_field")]
    pub prompts_field: String,

    #[serde(default = "default_boolean_fields")]
    pub boolean: Vec<String>,

    /// A field whose short name ends with one of these is a schedule.
    #[serde(default = "default_schedule_suffixes")]
    pub schedule_suffixes: Vec<String>,

    /// Schedule fields that do not carry a suffix.
    #[serde(default = "default_schedule_fields")]
    pub schedule_fields: Vec<String>,

    /// Enumerated-choice fields and their known options.
    #[serde(default = "default_choices")]
    pub choices: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub init_image: InitImageFields,
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self {
            prompts_field: default_prompts_field(),
            boolean: default_boolean_fields(),
            schedule_suffixes: default_schedule_suffixes(),
            schedule_fields: default_schedule_fields(),
            choices: default_choices(),
            init_image: InitImageFields::default(),
        }
    }
}

/// Samplers offered for the `sampler` choice field.
pub const SAMPLERS: &[&str] = &[
    "euler",
    "euler_a",
    "lms",
    "heun",
    "dpm_2",
    "dpm_2_a",
    "dpmpp_2s_a",
    "dpmpp_2m",
    "dpmpp_sde",
    "ddim",
    "uni_pc",
];

fn default_prompts_field() -> String {
    "prompts".to_string()
}

fn default_boolean_fields() -> Vec<String> {
    ["use_horizontal_flip", "use_vertical_flip", "normalize_latent_vectors", "use_init"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_schedule_suffixes() -> Vec<String> {
    vec!["_schedule".to_string()]
}

fn default_schedule_fields() -> Vec<String> {
    vec!["cfg_scale".to_string()]
}

fn default_choices() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([(
        "sampler".to_string(),
        SAMPLERS.iter().map(|s| s.to_string()).collect(),
    )])
}

impl FieldCatalog {
    /// Classify a field by its short name.
    ///
    /// Checks run in a fixed order: boolean, enumerated choice, prompts,
    /// schedule, and everything else is numeric.
    pub fn classify(&self, field: &str) -> FieldKind {
        let name = short_name(field);
        if self.boolean.iter().any(|b| b == name) {
            FieldKind::Boolean
        } else if self.choices.contains_key(name) {
            FieldKind::EnumeratedChoice
        } else if name == self.prompts_field {
            FieldKind::PromptCollection
        } else if self.is_schedule(name) {
            FieldKind::Schedule
        } else {
            FieldKind::Numeric
        }
    }

    /// Known options for an enumerated-choice field.
    pub fn choices_for(&self, field: &str) -> Option<&[String]> {
        self.choices.get(short_name(field)).map(|v| v.as_slice())
    }

    fn is_schedule(&self, name: &str) -> bool {
        self.schedule_fields.iter().any(|f| f == name)
            || self
                .schedule_suffixes
                .iter()
                .any(|suffix| !suffix.is_empty() && name.ends_with(suffix.as_str()))
    }
}

/// Last segment of a dotted field path (`motion.zoom` -> `zoom`).
pub fn short_name(field: &str) -> &str {
    field.rsplit('.').next().unwrap_or(field)
}
