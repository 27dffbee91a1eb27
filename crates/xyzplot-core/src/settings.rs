//! Loading base settings documents and discovering their parameters.
//!
//! A base document is a JSON object. Full-line `//` and `#` comments are
//! allowed and removed before parsing; they are replaced by blank lines so
//! that parser positions still point at the right line.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::fields::{FieldCatalog, FieldKind};
use crate::prompts::Prompts;

/// The loaded base configuration: an insertion-ordered JSON object.
pub type BaseConfiguration = Map<String, Value>;

/// Fields that can always be targeted by an axis, even when the base
/// document does not carry them.
pub const ALWAYS_AVAILABLE: &[&str] = &["prompts", "sampler", "rotation_2d"];

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings document is empty")]
    Empty,

    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but its root is not an object.
    #[error("settings document must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Remove full-line `//` and `#` comments, keeping line numbering intact.
pub fn strip_comment_lines(text: &str) -> String {
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("//") || trimmed.starts_with('#') {
                ""
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a base settings document from text.
pub fn parse_base(text: &str) -> Result<BaseConfiguration> {
    let cleaned = strip_comment_lines(text);
    if cleaned.trim().is_empty() {
        return Err(SettingsError::Empty);
    }
    match serde_json::from_str::<Value>(&cleaned)? {
        Value::Object(map) => Ok(map),
        other => Err(SettingsError::NotAnObject {
            found: json_type_name(&other),
        }),
    }
}

/// Read and parse a base settings file.
pub fn load_base(path: &Path) -> Result<BaseConfiguration> {
    let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_base(&text)
}

/// A field that an axis may target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterInfo {
    /// Dotted path into the document.
    pub name: String,
    pub kind: FieldKind,
    /// Value in the base document, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<Value>,
}

/// List every leaf field of `base` as a sorted dotted path.
///
/// Nested objects are descended; arrays and the prompts field are leaves.
pub fn list_parameters(base: &BaseConfiguration, catalog: &FieldCatalog) -> Vec<ParameterInfo> {
    let mut leaves = Vec::new();
    collect_leaves(base, "", catalog, &mut leaves);

    for name in ALWAYS_AVAILABLE {
        if !leaves.iter().any(|(path, _)| path == name) {
            leaves.push((name.to_string(), None));
        }
    }

    leaves.sort_by(|a, b| a.0.cmp(&b.0));
    leaves
        .into_iter()
        .map(|(name, current)| ParameterInfo {
            kind: catalog.classify(&name),
            name,
            current,
        })
        .collect()
}

fn collect_leaves(
    obj: &Map<String, Value>,
    prefix: &str,
    catalog: &FieldCatalog,
    out: &mut Vec<(String, Option<Value>)>,
) {
    for (key, value) in obj {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(inner) if key != &catalog.prompts_field => {
                collect_leaves(inner, &path, catalog, out);
            }
            other => out.push((path, Some(other.clone()))),
        }
    }
}

/// The base document's prompt keyframes, defaulting to one empty frame.
pub fn prompts_of(base: &BaseConfiguration, catalog: &FieldCatalog) -> Prompts {
    base.get(&catalog.prompts_field)
        .and_then(Prompts::from_value)
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| Prompts::single(""))
}

/// Look up a dotted path.
pub fn get_path<'a>(doc: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = doc.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
