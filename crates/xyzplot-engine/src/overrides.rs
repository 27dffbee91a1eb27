//! Writing axis values into document copies.

use serde_json::{Map, Value};
use tracing::warn;

use xyzplot_core::axis::{AxisId, PromptMode};
use xyzplot_core::fields::{FieldKind, InitImageFields};
use xyzplot_core::prompts::Prompts;
use xyzplot_core::value::{ParsedValue, parse_finite};

use crate::types::Warning;

/// How one axis writes its value.
#[derive(Debug, Clone, Copy)]
pub struct OverrideOptions {
    pub axis: AxisId,
    pub kind: FieldKind,
    pub prompt_mode: PromptMode,
}

/// Apply `value` to `field` in `doc`.
///
/// Prompt fields are merged into `prompts` instead of the document. All other
/// kinds, schedules included, store the value as resolved.
pub fn apply_override(
    doc: &mut Map<String, Value>,
    prompts: &mut Prompts,
    field: &str,
    value: &ParsedValue,
    opts: &OverrideOptions,
) -> Vec<Warning> {
    match opts.kind {
        FieldKind::PromptCollection => merge_prompt(prompts, value, opts.prompt_mode, opts.axis)
            .into_iter()
            .collect(),
        _ => set_path(doc, field, value.to_json()),
    }
}

/// Set a dotted path, creating intermediate objects as needed.
///
/// A non-object value in the way is replaced by an object and reported.
pub fn set_path(doc: &mut Map<String, Value>, path: &str, value: Value) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let segments: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return warnings;
    };

    let mut current = doc;
    for (i, segment) in parents.iter().enumerate() {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            let warning = Warning::ReplacedIntermediate {
                field: path.to_string(),
                segment: segments[..=i].join("."),
            };
            warn!("{}", warning);
            warnings.push(warning);
            *entry = Value::Object(Map::new());
        }
        match entry {
            Value::Object(map) => current = map,
            _ => return warnings,
        }
    }
    current.insert(last.to_string(), value);
    warnings
}

/// Merge a prompt axis value into the keyframes.
///
/// `Append` adds `, <value>` to every frame. `Override` replaces the mapping:
/// text starting with `{` is read as a JSON keyframe object, anything else
/// becomes the frame `0` text.
pub fn merge_prompt(
    prompts: &mut Prompts,
    value: &ParsedValue,
    mode: PromptMode,
    axis: AxisId,
) -> Option<Warning> {
    match mode {
        PromptMode::Append => {
            prompts.append(&value.to_string());
            None
        }
        PromptMode::Override => {
            let text = value.to_string();
            if !text.trim_start().starts_with('{') {
                *prompts = Prompts::single(text);
                return None;
            }
            match serde_json::from_str::<Value>(&text)
                .ok()
                .as_ref()
                .and_then(Prompts::from_value)
            {
                Some(parsed) => {
                    *prompts = parsed;
                    None
                }
                None => {
                    let warning = Warning::PromptOverride {
                        axis,
                        value: text.clone(),
                    };
                    warn!("{}", warning);
                    *prompts = Prompts::single(text);
                    Some(warning)
                }
            }
        }
    }
}

/// Remove init-image dependents when the init flag is `false`.
pub fn drop_stale_init_fields(doc: &mut Map<String, Value>, fields: &InitImageFields) {
    if doc.get(&fields.flag) == Some(&Value::Bool(false)) {
        for dependent in fields.dependents() {
            doc.shift_remove(dependent);
        }
    }
}

/// Recursively merge `overrides` into `target`; override values win.
///
/// Keys containing dots are treated as paths.
pub fn deep_merge(target: &mut Map<String, Value>, overrides: &Map<String, Value>) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for (key, value) in overrides {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                warnings.extend(deep_merge(existing, incoming));
            }
            _ if key.contains('.') => warnings.extend(set_path(target, key, value.clone())),
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
    warnings
}

/// Init-image settings applied to the effective base before the sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct InitImageSettings {
    pub use_init: bool,
    pub init_image: String,
    pub strength: String,
}

impl InitImageSettings {
    pub fn enabled(path: impl Into<String>, strength: impl Into<String>) -> Self {
        Self {
            use_init: true,
            init_image: path.into(),
            strength: strength.into(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            use_init: false,
            init_image: String::new(),
            strength: String::new(),
        }
    }

    /// Write the settings into `doc`.
    pub fn apply(&self, doc: &mut Map<String, Value>, fields: &InitImageFields) {
        if !self.use_init {
            doc.insert(fields.flag.clone(), Value::Bool(false));
            drop_stale_init_fields(doc, fields);
            return;
        }
        doc.insert(fields.flag.clone(), Value::Bool(true));
        doc.insert(
            fields.path.clone(),
            Value::String(normalize_path(&self.init_image)),
        );
        let strength = self.strength.trim();
        let strength = match parse_finite(strength) {
            Some(n) => ParsedValue::Number(n).to_json(),
            None => Value::String(strength.to_string()),
        };
        doc.insert(fields.strength.clone(), strength);
    }
}

/// Strip surrounding quotes and use forward slashes.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {:?}", other),
        }
    }

    fn opts(kind: FieldKind, prompt_mode: PromptMode) -> OverrideOptions {
        OverrideOptions {
            axis: AxisId::X,
            kind,
            prompt_mode,
        }
    }

    #[test]
    fn plain_field_is_assigned() {
        let mut d = doc(json!({"seed": 1}));
        let mut prompts = Prompts::single("a");
        let warnings = apply_override(
            &mut d,
            &mut prompts,
            "seed",
            &ParsedValue::Number(7.0),
            &opts(FieldKind::Numeric, PromptMode::Append),
        );
        assert!(warnings.is_empty());
        assert_eq!(d["seed"], json!(7));
        assert_eq!(prompts, Prompts::single("a"));
    }

    #[test]
    fn schedule_values_stay_raw() {
        let mut d = doc(json!({"cfg_scale": "0: (7)"}));
        let mut prompts = Prompts::new();
        apply_override(
            &mut d,
            &mut prompts,
            "cfg_scale",
            &ParsedValue::Number(9.5),
            &opts(FieldKind::Schedule, PromptMode::Append),
        );
        assert_eq!(d["cfg_scale"], json!(9.5));
    }

    #[test]
    fn dotted_path_creates_intermediates() {
        let mut d = doc(json!({"seed": 1}));
        let warnings = set_path(&mut d, "anim.motion.zoom", json!(1.02));
        assert!(warnings.is_empty());
        assert_eq!(d["anim"], json!({"motion": {"zoom": 1.02}}));
    }

    #[test]
    fn dotted_path_replaces_scalar_intermediate() {
        let mut d = doc(json!({"anim": 5}));
        let warnings = set_path(&mut d, "anim.zoom", json!(2));
        assert_eq!(d["anim"], json!({"zoom": 2}));
        assert_eq!(
            warnings,
            vec![Warning::ReplacedIntermediate {
                field: "anim.zoom".into(),
                segment: "anim".into(),
            }]
        );
    }

    #[test]
    fn append_prompt() {
        let mut prompts = Prompts::single("a cat");
        let warning = merge_prompt(
            &mut prompts,
            &ParsedValue::Text("in the rain".into()),
            PromptMode::Append,
            AxisId::X,
        );
        assert_eq!(warning, None);
        assert_eq!(prompts, Prompts::single("a cat, in the rain"));
    }

    #[test]
    fn override_prompt_with_json() {
        let mut prompts = Prompts::single("a cat");
        merge_prompt(
            &mut prompts,
            &ParsedValue::Text(r#"{"0": "a dog", "20": "a fox"}"#.into()),
            PromptMode::Override,
            AxisId::Y,
        );
        assert_eq!(prompts.get("0"), Some("a dog"));
        assert_eq!(prompts.get("20"), Some("a fox"));
    }

    #[test]
    fn override_prompt_with_broken_json_falls_back() {
        let mut prompts = Prompts::single("a cat");
        let warning = merge_prompt(
            &mut prompts,
            &ParsedValue::Text("{not json".into()),
            PromptMode::Override,
            AxisId::Y,
        );
        assert_eq!(prompts, Prompts::single("{not json"));
        assert!(matches!(warning, Some(Warning::PromptOverride { axis: AxisId::Y, .. })));
    }

    #[test]
    fn override_prompt_with_plain_value() {
        let mut prompts = Prompts::single("a cat");
        merge_prompt(
            &mut prompts,
            &ParsedValue::Number(3.0),
            PromptMode::Override,
            AxisId::X,
        );
        assert_eq!(prompts, Prompts::single("3"));
    }

    #[test]
    fn stale_init_fields_are_dropped() {
        let fields = InitImageFields::default();
        let mut d = doc(json!({"use_init": false, "init_image": "a.png", "strength": 0.5, "seed": 1}));
        drop_stale_init_fields(&mut d, &fields);
        assert_eq!(d, doc(json!({"use_init": false, "seed": 1})));

        let mut d = doc(json!({"use_init": true, "init_image": "a.png"}));
        drop_stale_init_fields(&mut d, &fields);
        assert!(d.contains_key("init_image"));
    }

    #[test]
    fn deep_merge_overrides_win() {
        let mut base = doc(json!({"a": {"b": 1, "c": 2}, "d": 3}));
        deep_merge(&mut base, &doc(json!({"a": {"b": 10}, "d": {"x": 1}, "e.f": 5})));
        assert_eq!(
            Value::Object(base),
            json!({"a": {"b": 10, "c": 2}, "d": {"x": 1}, "e": {"f": 5}})
        );
    }

    #[test]
    fn init_image_enabled() {
        let fields = InitImageFields::default();
        let mut d = Map::new();
        InitImageSettings::enabled("\"C:\\images\\start.png\"", " 0.65 ").apply(&mut d, &fields);
        assert_eq!(
            Value::Object(d),
            json!({"use_init": true, "init_image": "C:/images/start.png", "strength": 0.65})
        );
    }

    #[test]
    fn init_image_keeps_non_numeric_strength() {
        let fields = InitImageFields::default();
        let mut d = Map::new();
        InitImageSettings::enabled("a.png", "0: (0.6)").apply(&mut d, &fields);
        assert_eq!(d["strength"], json!("0: (0.6)"));
    }

    #[test]
    fn init_image_disabled() {
        let fields = InitImageFields::default();
        let mut d = doc(json!({"use_init": true, "init_image": "a.png", "strength": 0.5}));
        InitImageSettings::disabled().apply(&mut d, &fields);
        assert_eq!(Value::Object(d), json!({"use_init": false}));
    }
}
