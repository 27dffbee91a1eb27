//! `xyzplot config` -- create and inspect the project configuration.

use std::env;

use anyhow::{Context, Result, bail};

use xyzplot_config::config::{CONFIG_FILE_NAME, PlotConfig, save_config};
use xyzplot_config::plot_dir::ensure_plot_dir;

use crate::cli::{ConfigArgs, ConfigCommands, ConfigInitArgs};
use crate::context::RuntimeContext;
use crate::output::output_json;
use crate::styles::{ICON_PASS, render_pass};

/// Execute the `xyzplot config` command.
pub fn run(ctx: &RuntimeContext, args: &ConfigArgs) -> Result<()> {
    match &args.command {
        ConfigCommands::Init(init_args) => run_init(ctx, init_args),
        ConfigCommands::Show => run_show(ctx),
        ConfigCommands::Path => run_path(ctx),
    }
}

fn run_init(ctx: &RuntimeContext, args: &ConfigInitArgs) -> Result<()> {
    let target = match &ctx.config_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to read the working directory")?,
    };
    let plot_dir = ensure_plot_dir(&target)
        .with_context(|| format!("failed to create {}", target.display()))?;
    let config_path = plot_dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !args.force {
        bail!(
            "{} already exists\nHint: use --force to overwrite it",
            config_path.display()
        );
    }

    save_config(&plot_dir, &PlotConfig::default())
        .with_context(|| format!("failed to write {}", config_path.display()))?;

    if ctx.json {
        output_json(&serde_json::json!({
            "path": config_path,
            "created": true,
        }));
    } else if !ctx.quiet {
        println!(
            "{} Created {}",
            render_pass(ICON_PASS),
            config_path.display()
        );
    }
    Ok(())
}

fn run_show(ctx: &RuntimeContext) -> Result<()> {
    let config = ctx.load_config()?;
    if ctx.json {
        output_json(&config);
    } else {
        let yaml = serde_yaml::to_string(&config).context("failed to render configuration")?;
        print!("{}", yaml);
    }
    Ok(())
}

fn run_path(ctx: &RuntimeContext) -> Result<()> {
    let plot_dir = ctx.resolve_plot_dir();
    if ctx.json {
        output_json(&serde_json::json!({ "path": plot_dir }));
        return Ok(());
    }
    match plot_dir {
        Some(dir) => println!("{}", dir.display()),
        None => bail!("no .xyzplot directory found (run 'xyzplot config init' first)"),
    }
    Ok(())
}
