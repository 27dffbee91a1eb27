//! Combination generator.
//!
//! Walks the Cartesian product of the resolved axes (Z outermost, X
//! innermost) and derives one document per combination from a fresh copy of
//! the effective base.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use tracing::{debug, info};

use xyzplot_core::axis::{Axis, AxisId, PromptMode};
use xyzplot_core::fields::FieldCatalog;
use xyzplot_core::naming::{DuplicatePolicy, NamingOptions};
use xyzplot_core::prompts::Prompts;
use xyzplot_core::settings::{BaseConfiguration, prompts_of};
use xyzplot_core::value::ParsedValue;

use crate::naming::{render, suggest_template};
use crate::overrides::{
    InitImageSettings, OverrideOptions, apply_override, deep_merge, drop_stale_init_fields,
};
use crate::resolve::resolve;
use crate::types::{
    AxisParam, GeneratedArtifact, GenerationReport, PlotError, PlotParams, Provenance,
    ResolvedAxis, Result, Warning,
};

/// Name recorded in the `generated_by` field by default.
pub const GENERATED_BY: &str = "xyzplot";

/// Key of the provenance block in each document.
pub const META_KEY: &str = "meta";

/// Everything the host supplies for one generation pass.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub base: BaseConfiguration,
    pub x: Axis,
    pub y: Axis,
    /// Ignored unless present and enabled.
    pub z: Option<Axis>,
    /// Prompt keyframes; `None` takes them from the base.
    pub prompts: Option<Prompts>,
    /// Flat overrides merged over the base before the sweep.
    pub common: Map<String, Value>,
    pub init_image: Option<InitImageSettings>,
}

impl GenerationRequest {
    pub fn new(base: BaseConfiguration, x: Axis, y: Axis) -> Self {
        Self {
            base,
            x,
            y,
            z: None,
            prompts: None,
            common: Map::new(),
            init_image: None,
        }
    }

    /// The Z axis if it takes part in generation.
    pub fn active_z(&self) -> Option<&Axis> {
        self.z.as_ref().filter(|z| z.enabled)
    }

    /// Base merged with the common overrides and init-image settings.
    pub fn effective_base(&self, catalog: &FieldCatalog) -> (BaseConfiguration, Vec<Warning>) {
        let mut effective = self.base.clone();
        let warnings = deep_merge(&mut effective, &self.common);
        if let Some(init) = &self.init_image {
            init.apply(&mut effective, &catalog.init_image);
        }
        (effective, warnings)
    }
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub catalog: FieldCatalog,
    pub naming: NamingOptions,
    pub generated_by: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            catalog: FieldCatalog::default(),
            naming: NamingOptions::default(),
            generated_by: GENERATED_BY.to_string(),
        }
    }
}

/// Resolve the request's axes and check the generation preconditions.
///
/// Fields are checked X, Y, Z before any values are looked at, so a request
/// missing both X and Y reports X.
pub fn resolve_axes(request: &GenerationRequest, catalog: &FieldCatalog) -> Result<Vec<ResolvedAxis>> {
    let mut axes = vec![&request.x, &request.y];
    if let Some(z) = request.active_z() {
        axes.push(z);
    }

    for axis in &axes {
        if !axis.has_field() {
            return Err(PlotError::MissingField { axis: axis.id });
        }
    }

    let resolved: Vec<ResolvedAxis> = axes.iter().map(|a| resolve(a, catalog)).collect();
    for axis in &resolved {
        if axis.is_empty() {
            return Err(PlotError::EmptyAxis {
                axis: axis.id,
                field: axis.field.clone(),
            });
        }
    }
    Ok(resolved)
}

/// Generate one document per combination of axis values.
///
/// `now` stamps the provenance block and the `{timestring}` placeholder.
pub fn generate(
    request: &GenerationRequest,
    options: &GenerateOptions,
    now: DateTime<Local>,
) -> Result<GenerationReport> {
    let catalog = &options.catalog;
    let axes = resolve_axes(request, catalog)?;

    let mut report = GenerationReport {
        artifacts: Vec::new(),
        axes: Vec::new(),
        warnings: Vec::new(),
        duplicates: Vec::new(),
    };
    for warning in axes.iter().flat_map(|a| a.warnings.iter()) {
        report.push_warning(warning.clone());
    }

    let (effective, merge_warnings) = request.effective_base(catalog);
    for warning in merge_warnings {
        report.push_warning(warning);
    }
    let base_prompts = request
        .prompts
        .clone()
        .unwrap_or_else(|| prompts_of(&effective, catalog));

    let template = options
        .naming
        .template
        .clone()
        .unwrap_or_else(|| suggest_template(true, true, axes.len() > 2));

    let modes: HashMap<AxisId, PromptMode> = [&request.x, &request.y]
        .into_iter()
        .chain(request.active_z())
        .map(|a| (a.id, a.prompt_mode))
        .collect();

    let (x, y) = (&axes[0], &axes[1]);
    let z_values: Vec<Option<&ParsedValue>> = match axes.get(2) {
        Some(z) => z.values.iter().map(Some).collect(),
        None => vec![None],
    };

    let mut names = NameRegistry::new(&options.naming);
    for z_value in &z_values {
        for y_value in &y.values {
            for x_value in &x.values {
                let mut combination = vec![(x, x_value), (y, y_value)];
                if let (Some(z), Some(value)) = (axes.get(2), z_value) {
                    combination.push((z, *value));
                }

                let mut document = effective.clone();
                let mut prompts = base_prompts.clone();
                let mut overrides = Map::new();
                for (axis, value) in &combination {
                    let opts = OverrideOptions {
                        axis: axis.id,
                        kind: axis.kind,
                        prompt_mode: modes.get(&axis.id).copied().unwrap_or_default(),
                    };
                    for warning in
                        apply_override(&mut document, &mut prompts, &axis.field, value, &opts)
                    {
                        report.push_warning(warning);
                    }
                    overrides.insert(axis.field.clone(), value.to_json());
                }
                document.insert(catalog.prompts_field.clone(), prompts.to_value());
                drop_stale_init_fields(&mut document, &catalog.init_image);

                let provenance = Provenance {
                    generated_by: options.generated_by.clone(),
                    generated_at: now,
                    plot_params: plot_params(&combination),
                };
                let rendered = render(&template, &provenance, &document, &options.naming);
                let filename = match names.claim(rendered) {
                    Claim::Unique(name) => name,
                    Claim::Duplicate { name, original } => {
                        report.push_warning(Warning::DuplicateFilename {
                            filename: original.clone(),
                        });
                        if !report.duplicates.contains(&original) {
                            report.duplicates.push(original);
                        }
                        name
                    }
                };

                let meta = provenance
                    .to_value()
                    .map_err(|source| PlotError::Serialize {
                        filename: filename.clone(),
                        source,
                    })?;
                document.insert(META_KEY.to_string(), meta);

                debug!(filename = %filename, "generated combination");
                report.artifacts.push(GeneratedArtifact {
                    overrides,
                    document,
                    filename,
                    provenance,
                });
            }
        }
    }

    info!(
        files = report.artifacts.len(),
        warnings = report.warnings.len(),
        duplicates = report.duplicates.len(),
        "generation complete"
    );
    report.axes = axes;
    Ok(report)
}

fn plot_params(combination: &[(&ResolvedAxis, &ParsedValue)]) -> PlotParams {
    let param = |id: AxisId| {
        combination
            .iter()
            .find(|(axis, _)| axis.id == id)
            .map(|(axis, value)| AxisParam {
                param: axis.field.clone(),
                value: (*value).clone(),
            })
    };
    PlotParams {
        x_axis: param(AxisId::X).unwrap_or_else(|| AxisParam {
            param: String::new(),
            value: ParsedValue::Text(String::new()),
        }),
        y_axis: param(AxisId::Y).unwrap_or_else(|| AxisParam {
            param: String::new(),
            value: ParsedValue::Text(String::new()),
        }),
        z_axis: param(AxisId::Z),
    }
}

enum Claim {
    Unique(String),
    Duplicate { name: String, original: String },
}

/// Tracks rendered names and applies the duplicate policy.
struct NameRegistry<'a> {
    options: &'a NamingOptions,
    counts: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl<'a> NameRegistry<'a> {
    fn new(options: &'a NamingOptions) -> Self {
        Self {
            options,
            counts: HashMap::new(),
            taken: HashSet::new(),
        }
    }

    fn claim(&mut self, rendered: String) -> Claim {
        let count = self.counts.entry(rendered.clone()).or_insert(0);
        *count += 1;
        let seen = *count;

        if seen == 1 && !self.taken.contains(&rendered) {
            self.taken.insert(rendered.clone());
            return Claim::Unique(rendered);
        }

        let name = match self.options.on_duplicate {
            DuplicatePolicy::Warn => rendered.clone(),
            DuplicatePolicy::Suffix => self.next_free(&rendered, seen.max(2)),
        };
        self.taken.insert(name.clone());
        Claim::Duplicate {
            name,
            original: rendered,
        }
    }

    fn next_free(&self, rendered: &str, start: usize) -> String {
        let ext = self.options.extension.as_str();
        let stem = match rendered.strip_suffix(ext) {
            Some(stem) if !ext.is_empty() => stem,
            _ => rendered,
        };
        let ext = if stem.len() == rendered.len() { "" } else { ext };
        let mut n = start;
        loop {
            let candidate = format!("{}_{}{}", stem, n, ext);
            if !self.taken.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use xyzplot_core::settings::parse_base;

    fn base() -> BaseConfiguration {
        parse_base(
            r#"{
                "W": 512,
                "H": 512,
                "seed": 1,
                "steps": 20,
                "cfg_scale": "0: (7)",
                "sampler": "euler",
                "use_init": true,
                "init_image": "start.png",
                "strength": 0.5,
                "prompts": {"0": "a cat", "30": "a dog"}
            }"#,
        )
        .unwrap()
    }

    fn now(hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(
            base(),
            Axis::new(AxisId::X, "seed").expression("1-3"),
            Axis::new(AxisId::Y, "steps").expression("10, 20"),
        )
    }

    fn pairs(report: &GenerationReport) -> Vec<(Value, Value)> {
        report
            .artifacts
            .iter()
            .map(|a| (a.document["seed"].clone(), a.document["steps"].clone()))
            .collect()
    }

    #[test]
    fn cartesian_product_x_innermost() {
        let report = generate(&request(), &GenerateOptions::default(), now(1)).unwrap();
        assert_eq!(report.artifacts.len(), 6);
        assert_eq!(
            pairs(&report),
            vec![
                (json!(1), json!(10)),
                (json!(2), json!(10)),
                (json!(3), json!(10)),
                (json!(1), json!(20)),
                (json!(2), json!(20)),
                (json!(3), json!(20)),
            ]
        );
        assert!(report.duplicates.is_empty());
        assert_eq!(report.axes.len(), 2);
    }

    #[test]
    fn z_axis_is_outermost() {
        let mut req = request();
        req.z = Some(Axis::new(AxisId::Z, "sampler").choice("euler").choice("ddim"));
        let report = generate(&req, &GenerateOptions::default(), now(1)).unwrap();
        assert_eq!(report.artifacts.len(), 12);
        assert_eq!(report.artifacts[0].document["sampler"], json!("euler"));
        assert_eq!(report.artifacts[5].document["sampler"], json!("euler"));
        assert_eq!(report.artifacts[6].document["sampler"], json!("ddim"));
        assert_eq!(
            report.artifacts[6].document["meta"]["plot_params"]["z_axis"],
            json!({"param": "sampler", "value": "ddim"})
        );
    }

    #[test]
    fn disabled_z_is_ignored() {
        let mut req = request();
        req.z = Some(Axis::new(AxisId::Z, "").enabled(false));
        let report = generate(&req, &GenerateOptions::default(), now(1)).unwrap();
        assert_eq!(report.artifacts.len(), 6);
        assert!(report.artifacts[0].document["meta"]["plot_params"]
            .get("z_axis")
            .is_none());
    }

    #[test]
    fn documents_are_independent() {
        let req = request();
        let mut report = generate(&req, &GenerateOptions::default(), now(1)).unwrap();
        report.artifacts[0]
            .document
            .insert("seed".into(), json!(999));
        report.artifacts[0].document["prompts"]["0"] = json!("changed");
        assert_eq!(report.artifacts[1].document["seed"], json!(2));
        assert_eq!(report.artifacts[3].document["prompts"]["0"], json!("a cat"));
        assert_eq!(req.base["seed"], json!(1));
        assert_eq!(req.base, base());
    }

    #[test]
    fn filenames_differ_only_in_timestring() {
        let options = GenerateOptions::default();
        let first = generate(&request(), &options, now(1)).unwrap();
        let second = generate(&request(), &options, now(2)).unwrap();
        for (a, b) in first.artifacts.iter().zip(&second.artifacts) {
            assert_ne!(a.filename, b.filename);
            assert_eq!(
                a.filename.replace("20240601_010000", "T"),
                b.filename.replace("20240601_020000", "T")
            );
        }
        assert_eq!(
            first.artifacts[0].filename,
            "20240601_010000_xyz_plot_seed-1_steps-10_Seed-1_CFG-0_7.txt"
        );
    }

    #[test]
    fn prompt_append_axis() {
        let req = GenerationRequest::new(
            base(),
            Axis::new(AxisId::X, "prompts").expression("in the rain"),
            Axis::new(AxisId::Y, "seed").expression("1"),
        );
        let report = generate(&req, &GenerateOptions::default(), now(1)).unwrap();
        assert_eq!(
            report.artifacts[0].document["prompts"],
            json!({"0": "a cat, in the rain", "30": "a dog, in the rain"})
        );
    }

    #[test]
    fn prompt_override_with_invalid_json() {
        let req = GenerationRequest::new(
            base(),
            Axis::new(AxisId::X, "seed").expression("1"),
            Axis::new(AxisId::Y, "prompts")
                .expression("{not json")
                .prompt_mode(PromptMode::Override),
        );
        let report = generate(&req, &GenerateOptions::default(), now(1)).unwrap();
        assert_eq!(report.artifacts[0].document["prompts"], json!({"0": "{not json"}));
        assert!(report
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::PromptOverride { axis: AxisId::Y, .. })));
    }

    #[test]
    fn explicit_prompts_replace_base_prompts() {
        let mut req = request();
        req.prompts = Some(Prompts::single("a fox"));
        let report = generate(&req, &GenerateOptions::default(), now(1)).unwrap();
        assert_eq!(report.artifacts[0].document["prompts"], json!({"0": "a fox"}));
    }

    #[test]
    fn missing_y_field_is_reported() {
        let req = GenerationRequest::new(
            base(),
            Axis::new(AxisId::X, "seed").expression("1"),
            Axis::new(AxisId::Y, ""),
        );
        match generate(&req, &GenerateOptions::default(), now(1)) {
            Err(PlotError::MissingField { axis }) => assert_eq!(axis, AxisId::Y),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn missing_fields_checked_before_values() {
        let req = GenerationRequest::new(
            base(),
            Axis::new(AxisId::X, "seed"),
            Axis::new(AxisId::Y, ""),
        );
        let err = generate(&req, &GenerateOptions::default(), now(1)).unwrap_err();
        assert_eq!(err.axis(), Some(AxisId::Y));
    }

    #[test]
    fn empty_axis_is_reported() {
        let req = GenerationRequest::new(
            base(),
            Axis::new(AxisId::X, "seed").expression("5-1"),
            Axis::new(AxisId::Y, "steps").expression("1"),
        );
        match generate(&req, &GenerateOptions::default(), now(1)) {
            Err(PlotError::EmptyAxis { axis, field }) => {
                assert_eq!(axis, AxisId::X);
                assert_eq!(field, "seed");
            }
            other => panic!("expected EmptyAxis, got {:?}", other),
        }
    }

    #[test]
    fn enabled_z_without_field() {
        let mut req = request();
        req.z = Some(Axis::new(AxisId::Z, " "));
        let err = generate(&req, &GenerateOptions::default(), now(1)).unwrap_err();
        assert!(matches!(err, PlotError::MissingField { axis: AxisId::Z }));
    }

    #[test]
    fn init_fields_removed_when_plotted_off() {
        let req = GenerationRequest::new(
            base(),
            Axis::new(AxisId::X, "use_init").expression("true, false"),
            Axis::new(AxisId::Y, "seed").expression("1"),
        );
        let report = generate(&req, &GenerateOptions::default(), now(1)).unwrap();
        let on = &report.artifacts[0].document;
        let off = &report.artifacts[1].document;
        assert_eq!(on["init_image"], json!("start.png"));
        assert_eq!(off["use_init"], json!(false));
        assert!(!off.contains_key("init_image"));
        assert!(!off.contains_key("strength"));
    }

    #[test]
    fn common_overrides_and_init_settings() {
        let mut req = request();
        req.common.insert("cfg_scale".into(), json!("0: (9)"));
        req.common.insert("seed".into(), json!(77));
        req.init_image = Some(InitImageSettings::disabled());
        let report = generate(&req, &GenerateOptions::default(), now(1)).unwrap();
        let doc = &report.artifacts[0].document;
        assert_eq!(doc["cfg_scale"], json!("0: (9)"));
        // axis values win over common overrides
        assert_eq!(doc["seed"], json!(1));
        assert_eq!(doc["use_init"], json!(false));
        assert!(!doc.contains_key("init_image"));
    }

    #[test]
    fn duplicates_are_reported() {
        let options = GenerateOptions {
            naming: NamingOptions {
                template: Some("plot_{steps}".into()),
                ..NamingOptions::default()
            },
            ..GenerateOptions::default()
        };
        let report = generate(&request(), &options, now(1)).unwrap();
        assert_eq!(report.duplicates, vec!["plot_10.txt", "plot_20.txt"]);
        assert_eq!(report.artifacts[1].filename, "plot_10.txt");
        assert!(report
            .warnings
            .contains(&Warning::DuplicateFilename { filename: "plot_10.txt".into() }));
    }

    #[test]
    fn duplicates_get_suffixes() {
        let options = GenerateOptions {
            naming: NamingOptions {
                template: Some("plot_{steps}".into()),
                on_duplicate: DuplicatePolicy::Suffix,
                ..NamingOptions::default()
            },
            ..GenerateOptions::default()
        };
        let report = generate(&request(), &options, now(1)).unwrap();
        let names: Vec<_> = report.artifacts.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "plot_10.txt",
                "plot_10_2.txt",
                "plot_10_3.txt",
                "plot_20.txt",
                "plot_20_2.txt",
                "plot_20_3.txt",
            ]
        );
        assert_eq!(report.duplicates, vec!["plot_10.txt", "plot_20.txt"]);
    }

    #[test]
    fn provenance_and_overrides_recorded() {
        let report = generate(&request(), &GenerateOptions::default(), now(1)).unwrap();
        let artifact = &report.artifacts[4];
        assert_eq!(artifact.overrides, match json!({"seed": 2, "steps": 20}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        });
        assert_eq!(artifact.document["meta"]["generated_by"], json!("xyzplot"));
        assert_eq!(
            artifact.document["meta"]["plot_params"]["y_axis"],
            json!({"param": "steps", "value": 20})
        );
    }

    #[test]
    fn files_are_pretty_json() {
        let report = generate(&request(), &GenerateOptions::default(), now(1)).unwrap();
        let files = report.to_files().unwrap();
        assert_eq!(files.len(), 6);
        let parsed: Value = serde_json::from_str(&files[0].content).unwrap();
        assert_eq!(parsed["seed"], json!(1));
        assert!(files[0].content.contains("\n  \"W\": 512"));
    }

    #[test]
    fn nested_axis_field() {
        let req = GenerationRequest::new(
            base(),
            Axis::new(AxisId::X, "anim.noise_schedule").expression("0: (0.02)"),
            Axis::new(AxisId::Y, "seed").expression("1"),
        );
        let report = generate(&req, &GenerateOptions::default(), now(1)).unwrap();
        assert_eq!(
            report.artifacts[0].document["anim"],
            json!({"noise_schedule": "0: (0.02)"})
        );
        assert!(report.artifacts[0].filename.contains("noise_schedule-0_0.02"));
    }
}
