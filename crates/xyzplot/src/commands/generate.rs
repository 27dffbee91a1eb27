//! `xyzplot generate` -- write one settings file per axis combination.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use xyzplot_core::fields::{FieldCatalog, short_name};
use xyzplot_core::prompts::Prompts;
use xyzplot_core::settings::{BaseConfiguration, load_base};
use xyzplot_engine::common::{AnimationMode, CommonOverridesBuilder};
use xyzplot_engine::naming::sanitize;
use xyzplot_engine::overrides::InitImageSettings;
use xyzplot_engine::{GenerateOptions, GeneratedArtifact, GenerationRequest, generate};

use crate::cli::GenerateArgs;
use crate::commands::axes::{apply_naming, build_axes};
use crate::context::RuntimeContext;
use crate::output::{output_json, print_warnings};
use crate::styles::{ICON_PASS, render_accent, render_muted, render_pass};

/// Strength used with `--init-image` when neither the flag nor the base
/// provides one.
const DEFAULT_STRENGTH: &str = "0.8";

/// One file to be written.
#[derive(Debug, Serialize)]
struct PlannedFile {
    path: PathBuf,
    #[serde(skip)]
    content: String,
    x: Value,
    y: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    z: Option<Value>,
}

/// Execute the `xyzplot generate` command.
pub fn run(ctx: &RuntimeContext, args: &GenerateArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let base = load_base(&args.base)
        .with_context(|| format!("failed to load base settings {}", args.base.display()))?;

    let request = build_request(base, args, &config.fields)?;

    let mut naming = config.naming.clone();
    apply_naming(&args.naming, &mut naming)?;
    let options = GenerateOptions {
        catalog: config.fields.clone(),
        naming,
        generated_by: config.generated_by.clone(),
    };

    let report = generate(&request, &options, Local::now())?;
    let files = report.to_files()?;

    let out_dir = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.dir));
    let group_by_z = args.group_by_z || config.output.group_by_z;

    let planned: Vec<PlannedFile> = report
        .artifacts
        .iter()
        .zip(files)
        .map(|(artifact, file)| PlannedFile {
            path: target_path(&out_dir, artifact, group_by_z, &file.filename),
            content: file.content,
            x: artifact.provenance.plot_params.x_axis.value.to_json(),
            y: artifact.provenance.plot_params.y_axis.value.to_json(),
            z: artifact
                .provenance
                .plot_params
                .z_axis
                .as_ref()
                .map(|p| p.value.to_json()),
        })
        .collect();

    if !args.dry_run {
        write_files(&planned)?;
    }

    if ctx.json {
        let axes: Vec<Value> = report
            .axes
            .iter()
            .map(|a| {
                serde_json::json!({
                    "axis": a.id.letter(),
                    "field": a.field,
                    "kind": a.kind.as_str(),
                    "values": a.values,
                })
            })
            .collect();
        output_json(&serde_json::json!({
            "dry_run": args.dry_run,
            "out_dir": out_dir,
            "files": planned,
            "axes": axes,
            "warnings": report.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
            "duplicates": report.duplicates,
        }));
        return Ok(());
    }

    if !ctx.quiet {
        print_warnings(&report.warnings);
        for axis in &report.axes {
            println!(
                "{}",
                render_muted(&format!(
                    "{} {} ({}): {} values",
                    axis.id,
                    axis.field,
                    axis.kind,
                    axis.len()
                ))
            );
        }
        for file in &planned {
            println!("  {}", file.path.display());
        }
    }

    if args.dry_run {
        println!(
            "{}",
            render_accent(&format!(
                "Dry run: {} files would be written to {}",
                planned.len(),
                out_dir.display()
            ))
        );
    } else {
        println!(
            "{} Wrote {} files to {}",
            render_pass(ICON_PASS),
            planned.len(),
            out_dir.display()
        );
    }
    Ok(())
}

/// Assemble the generation request from the base document and flags.
fn build_request(
    base: BaseConfiguration,
    args: &GenerateArgs,
    catalog: &FieldCatalog,
) -> Result<GenerationRequest> {
    let axes = build_axes(&args.axes, catalog)?;
    let mut request = GenerationRequest::new(base, axes.x, axes.y);
    request.z = axes.z;

    let mut builder = CommonOverridesBuilder::new(catalog);
    for assignment in &args.set {
        let (field, value) = parse_assignment(assignment, "--set")?;
        builder = builder.set(field, value);
    }
    if let Some(mode) = &args.animation_mode {
        let mode: AnimationMode = mode.parse().map_err(|e: String| anyhow!(e))?;
        builder = builder.animation_mode(mode, &request.base);
    }
    let common = builder.build();
    request.common = common;

    request.init_image = if args.no_init {
        Some(InitImageSettings::disabled())
    } else if let Some(path) = &args.init_image {
        let strength = match &args.strength {
            Some(s) => s.clone(),
            None => base_strength(&request.base, catalog)
                .unwrap_or_else(|| DEFAULT_STRENGTH.to_string()),
        };
        Some(InitImageSettings::enabled(path.clone(), strength))
    } else {
        None
    };

    request.prompts = build_prompts(args)?;
    debug!(
        common = request.common.len(),
        init = request.init_image.is_some(),
        prompts = request.prompts.is_some(),
        "built generation request"
    );
    Ok(request)
}

fn base_strength(base: &BaseConfiguration, catalog: &FieldCatalog) -> Option<String> {
    match base.get(&catalog.init_image.strength)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Prompts from `--keyframe` or `--prompt`; `None` keeps the base prompts.
fn build_prompts(args: &GenerateArgs) -> Result<Option<Prompts>> {
    if !args.keyframe.is_empty() {
        let mut prompts = Prompts::new();
        for keyframe in &args.keyframe {
            let (frame, text) = parse_assignment(keyframe, "--keyframe")?;
            prompts.insert(frame, text);
        }
        return Ok(Some(prompts));
    }
    Ok(args.prompt.as_ref().map(|positive| {
        let negative = args.negative.as_deref().unwrap_or_default();
        Prompts::single(Prompts::from_positive_negative(positive, negative))
    }))
}

/// Split a `KEY=VALUE` flag value. The key is trimmed and must not be empty.
fn parse_assignment<'a>(raw: &'a str, flag: &str) -> Result<(&'a str, &'a str)> {
    let mut parts = raw.splitn(2, '=');
    let key = parts.next().unwrap_or_default().trim();
    let value = match parts.next() {
        Some(v) => v,
        None => bail!("invalid {} value '{}': expected KEY=VALUE", flag, raw),
    };
    if key.is_empty() {
        bail!("invalid {} value '{}': key must not be empty", flag, raw);
    }
    Ok((key, value))
}

/// Where an artifact is written. With grouping, files of one Z value share a
/// `z_<param>_<value>/` directory.
fn target_path(
    out_dir: &Path,
    artifact: &GeneratedArtifact,
    group_by_z: bool,
    filename: &str,
) -> PathBuf {
    match (&artifact.provenance.plot_params.z_axis, group_by_z) {
        (Some(z), true) => out_dir
            .join(format!(
                "z_{}_{}",
                sanitize(short_name(&z.param)),
                sanitize(&z.value.to_string())
            ))
            .join(filename),
        _ => out_dir.join(filename),
    }
}

fn write_files(files: &[PlannedFile]) -> Result<()> {
    for file in files {
        if let Some(parent) = file.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&file.path, &file.content)
            .with_context(|| format!("failed to write {}", file.path.display()))?;
        debug!(path = %file.path.display(), "wrote settings file");
    }
    Ok(())
}
