//! Filename templates.
//!
//! Templates use single-brace placeholders such as `{x_param}`. Known
//! placeholders are replaced by sanitized values; anything else in braces is
//! left as written.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use serde_json::{Map, Value};

use xyzplot_core::axis::AxisId;
use xyzplot_core::fields::short_name;
use xyzplot_core::naming::NamingOptions;

use crate::types::{Provenance, ResolvedAxis};

/// Placeholders understood by [`render`].
pub const KNOWN_VARIABLES: &[&str] = &[
    "timestring",
    "filename",
    "seed",
    "seed_behavior",
    "w",
    "h",
    "x_param",
    "x_value",
    "y_param",
    "y_value",
    "z_param",
    "z_value",
    "steps",
    "cfg_scale",
    "sampler",
    "strength",
    "max_frames",
];

const NONE: &str = "none";

/// Render the filename for one generated document.
pub fn render(
    template: &str,
    provenance: &Provenance,
    settings: &Map<String, Value>,
    options: &NamingOptions,
) -> String {
    let mut vars = settings_variables(settings, options);
    vars.insert("timestring", provenance.timestring());
    for axis in AxisId::ALL {
        let (param, value) = match provenance.plot_params.get(axis) {
            Some(p) => (sanitize(short_name(&p.param)), sanitize(&p.value.to_string())),
            None => (NONE.to_string(), NONE.to_string()),
        };
        vars.insert(param_key(axis), param);
        vars.insert(value_key(axis), value);
    }
    finish(template, &vars, options)
}

/// Render a preview name from the first value of each resolved axis.
///
/// Axes without values show `[x_val]`-style markers instead.
pub fn preview(
    template: &str,
    axes: &[ResolvedAxis],
    settings: &Map<String, Value>,
    options: &NamingOptions,
    now: DateTime<Local>,
) -> String {
    let mut vars = settings_variables(settings, options);
    vars.insert("timestring", now.format("%Y%m%d_%H%M%S").to_string());
    for id in AxisId::ALL {
        let axis = axes.iter().find(|a| a.id == id && !a.field.is_empty());
        let (param, value) = match (axis, id) {
            (Some(a), _) => (
                sanitize(short_name(&a.field)),
                a.values
                    .first()
                    .map(|v| sanitize(&v.to_string()))
                    .unwrap_or_else(|| format!("[{}_val]", id.letter())),
            ),
            (None, AxisId::Z) => (NONE.to_string(), NONE.to_string()),
            (None, _) => (
                format!("[{}_param]", id.letter()),
                format!("[{}_val]", id.letter()),
            ),
        };
        vars.insert(param_key(id), param);
        vars.insert(value_key(id), value);
    }
    finish(template, &vars, options)
}

/// The default template for the given active axes.
pub fn suggest_template(x_active: bool, y_active: bool, z_active: bool) -> String {
    let mut template = String::from("{timestring}_{filename}");
    for (active, axis) in [(x_active, "x"), (y_active, "y"), (z_active, "z")] {
        if active {
            template.push_str(&format!("_{{{axis}_param}}-{{{axis}_value}}"));
        }
    }
    template.push_str("_Seed-{seed}_CFG-{cfg_scale}");
    template
}

/// Known placeholders used by `template`, in order of first use.
pub fn template_variables(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    for name in scan_placeholders(template) {
        if KNOWN_VARIABLES.contains(&name) && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Placeholders in `template` that [`render`] will leave untouched.
pub fn unknown_placeholders(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    for name in scan_placeholders(template) {
        if !KNOWN_VARIABLES.contains(&name) && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Make a value safe for use in a filename.
///
/// Whitespace becomes `_`; every character outside `[A-Za-z0-9_.-]` is
/// dropped. Empty text stays empty; only missing values become `none`.
pub fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}

fn settings_variables(
    settings: &Map<String, Value>,
    options: &NamingOptions,
) -> HashMap<&'static str, String> {
    let field = |name: &str| sanitize_json(settings.get(name));
    let strength = settings
        .get("strength")
        .filter(|v| !v.is_null())
        .or_else(|| settings.get("strength_schedule"));

    HashMap::from([
        ("filename", sanitize(&options.filename)),
        ("seed", field("seed")),
        ("seed_behavior", field("seed_behavior")),
        ("w", field("W")),
        ("h", field("H")),
        ("steps", field("steps")),
        ("cfg_scale", field("cfg_scale")),
        ("sampler", field("sampler")),
        ("strength", sanitize_json(strength)),
        ("max_frames", field("max_frames")),
    ])
}

fn sanitize_json(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NONE.to_string(),
        Some(Value::String(s)) => sanitize(s),
        Some(other) => sanitize(&other.to_string()),
    }
}

fn param_key(axis: AxisId) -> &'static str {
    match axis {
        AxisId::X => "x_param",
        AxisId::Y => "y_param",
        AxisId::Z => "z_param",
    }
}

fn value_key(axis: AxisId) -> &'static str {
    match axis {
        AxisId::X => "x_value",
        AxisId::Y => "y_value",
        AxisId::Z => "z_value",
    }
}

fn finish(template: &str, vars: &HashMap<&'static str, String>, options: &NamingOptions) -> String {
    let mut name = substitute(template, vars);
    name.push_str(&options.extension);
    name
}

fn is_var_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_var_cont(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Replace `{name}` for every name in `vars`; unknown names stay verbatim.
fn substitute(text: &str, vars: &HashMap<&'static str, String>) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open..];
        match placeholder_at(after) {
            Some(name) => {
                match vars.get(name) {
                    Some(val) => result.push_str(val),
                    None => result.push_str(&after[..name.len() + 2]),
                }
                rest = &after[name.len() + 2..];
            }
            None => {
                result.push('{');
                rest = &after[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

/// If `text` starts with `{name}`, return `name`.
fn placeholder_at(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    if bytes.len() < 3 || bytes[0] != b'{' || !is_var_start(bytes[1]) {
        return None;
    }
    let mut end = 2;
    while end < bytes.len() && is_var_cont(bytes[end]) {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'}' {
        Some(&text[1..end])
    } else {
        None
    }
}

fn scan_placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open..];
        match placeholder_at(after) {
            Some(name) => {
                names.push(name);
                rest = &after[name.len() + 2..];
            }
            None => rest = &after[1..],
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AxisParam, PlotParams};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use xyzplot_core::fields::FieldKind;
    use xyzplot_core::value::ParsedValue;

    fn settings() -> Map<String, Value> {
        match json!({
            "seed": 42,
            "W": 512,
            "H": 768,
            "cfg_scale": "0: (7)",
            "sampler": "euler a",
            "strength_schedule": "0: (0.65)",
            "steps": 25,
            "max_frames": 120
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn provenance(hour: u32, z: bool) -> Provenance {
        Provenance {
            generated_by: "xyzplot".into(),
            generated_at: Local.with_ymd_and_hms(2024, 1, 2, hour, 4, 5).unwrap(),
            plot_params: PlotParams {
                x_axis: AxisParam {
                    param: "anim.noise_schedule".into(),
                    value: ParsedValue::Text("0: (0.02)".into()),
                },
                y_axis: AxisParam {
                    param: "seed".into(),
                    value: ParsedValue::Number(7.0),
                },
                z_axis: z.then(|| AxisParam {
                    param: "sampler".into(),
                    value: ParsedValue::Text("dpm++ 2m".into()),
                }),
            },
        }
    }

    #[test]
    fn renders_all_placeholders() {
        let template = "{timestring}_{filename}_{w}x{h}_{x_param}-{x_value}_{y_param}-{y_value}_{z_param}-{z_value}_{steps}_{cfg_scale}_{sampler}_{strength}_{max_frames}_{seed_behavior}";
        let name = render(template, &provenance(3, false), &settings(), &NamingOptions::default());
        assert_eq!(
            name,
            "20240102_030405_xyz_plot_512x768_noise_schedule-0_0.02_seed-7_none-none_25_0_7_euler_a_0_0.65_120_none.txt"
        );
    }

    #[test]
    fn z_axis_values() {
        let name = render(
            "{z_param}-{z_value}",
            &provenance(3, true),
            &settings(),
            &NamingOptions::default(),
        );
        assert_eq!(name, "sampler-dpm_2m.txt");
    }

    #[test]
    fn unknown_placeholders_left_verbatim() {
        let name = render(
            "{seed}_{nope}_{ {x}",
            &provenance(3, false),
            &settings(),
            &NamingOptions::default(),
        );
        assert_eq!(name, "42_{nope}_{ {x}.txt");
        assert_eq!(unknown_placeholders("{seed}_{nope}_{x}_{nope}"), vec!["nope", "x"]);
    }

    #[test]
    fn names_differ_only_in_timestring() {
        let options = NamingOptions::default();
        let template = suggest_template(true, true, false);
        let a = render(&template, &provenance(3, false), &settings(), &options);
        let b = render(&template, &provenance(9, false), &settings(), &options);
        assert_ne!(a, b);
        assert_eq!(a.replacen("20240102_030405", "", 1), b.replacen("20240102_090405", "", 1));
    }

    #[test]
    fn strength_prefers_plain_field() {
        let mut s = settings();
        s.insert("strength".into(), json!(0.8));
        let name = render("{strength}", &provenance(3, false), &s, &NamingOptions::default());
        assert_eq!(name, "0.8.txt");
    }

    #[test]
    fn custom_extension() {
        let options = NamingOptions {
            extension: ".json".into(),
            ..NamingOptions::default()
        };
        let name = render("{seed}", &provenance(3, false), &settings(), &options);
        assert_eq!(name, "42.json");
    }

    #[test]
    fn empty_filename_stays_empty() {
        let options = NamingOptions {
            filename: String::new(),
            ..NamingOptions::default()
        };
        let name = render("{filename}-{seed}", &provenance(3, false), &settings(), &options);
        assert_eq!(name, "-42.txt");
    }

    #[test]
    fn sanitize_values() {
        assert_eq!(sanitize("0: (1.5), 10: (2)"), "0_1.5_10_2");
        assert_eq!(sanitize("a/b\\c"), "abc");
        assert_eq!(sanitize("{\"0\":\"x\"}"), "0x");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn suggested_templates() {
        assert_eq!(
            suggest_template(true, true, false),
            "{timestring}_{filename}_{x_param}-{x_value}_{y_param}-{y_value}_Seed-{seed}_CFG-{cfg_scale}"
        );
        assert_eq!(
            suggest_template(true, true, true),
            "{timestring}_{filename}_{x_param}-{x_value}_{y_param}-{y_value}_{z_param}-{z_value}_Seed-{seed}_CFG-{cfg_scale}"
        );
    }

    #[test]
    fn template_variables_in_order() {
        assert_eq!(
            template_variables("{seed}_{x_value}_{seed}_{other}"),
            vec!["seed", "x_value"]
        );
    }

    #[test]
    fn preview_uses_first_values_or_markers() {
        let axes = vec![
            ResolvedAxis {
                id: AxisId::X,
                field: "seed".into(),
                kind: FieldKind::Numeric,
                values: vec![ParsedValue::Number(5.0), ParsedValue::Number(6.0)],
                warnings: Vec::new(),
            },
            ResolvedAxis::empty(AxisId::Y, "steps", FieldKind::Numeric),
        ];
        let now = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let name = preview(
            &suggest_template(true, true, false),
            &axes,
            &settings(),
            &NamingOptions::default(),
            now,
        );
        assert_eq!(
            name,
            "20240102_030405_xyz_plot_seed-5_steps-[y_val]_Seed-42_CFG-0_7.txt"
        );

        let name = preview("{x_param}_{z_value}", &[], &settings(), &NamingOptions::default(), now);
        assert_eq!(name, "[x_param]_none.txt");
    }
}
