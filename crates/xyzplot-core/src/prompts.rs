//! Prompt keyframes: an ordered frame-index to text mapping.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered mapping from frame index (as text) to prompt text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prompts(Map<String, Value>);

impl Prompts {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// A single keyframe at frame `0`.
    pub fn single(text: impl Into<String>) -> Self {
        let mut prompts = Self::new();
        prompts.insert("0", text);
        prompts
    }

    /// Build from a JSON object. Non-string texts are stringified; any other
    /// JSON shape yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let mut prompts = Self::new();
        for (frame, text) in obj {
            let text = match text {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            prompts.insert(frame.clone(), text);
        }
        Some(prompts)
    }

    /// Combine a positive and a negative prompt into the `pos --neg neg`
    /// form used by the renderer. An empty negative leaves `positive` as is.
    pub fn from_positive_negative(positive: &str, negative: &str) -> String {
        if negative.trim().is_empty() {
            positive.to_string()
        } else {
            format!("{} --neg {}", positive, negative)
        }
    }

    pub fn insert(&mut self, frame: impl Into<String>, text: impl Into<String>) {
        self.0.insert(frame.into(), Value::String(text.into()));
    }

    pub fn get(&self, frame: &str) -> Option<&str> {
        self.0.get(frame).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str().unwrap_or_default()))
    }

    /// Append `, <suffix>` to every keyframe.
    pub fn append(&mut self, suffix: &str) {
        for text in self.0.values_mut() {
            let current = text.as_str().unwrap_or_default();
            *text = Value::String(format!("{}, {}", current, suffix));
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}
