//! Runtime context for command execution.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use xyzplot_config::config::{PlotConfig, load_config};
use xyzplot_config::plot_dir::find_plot_dir;

use crate::cli::GlobalArgs;

/// State every command handler needs.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Explicit project directory from `--config-dir`.
    pub config_dir: Option<PathBuf>,

    /// Whether to produce JSON output.
    pub json: bool,

    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,
}

impl RuntimeContext {
    pub fn from_global_args(global: &GlobalArgs) -> Self {
        Self {
            config_dir: global.config_dir.clone(),
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
        }
    }

    /// The `.xyzplot/` directory in use, if any.
    ///
    /// `--config-dir` wins; otherwise the directory is discovered from the
    /// working directory.
    pub fn resolve_plot_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.config_dir {
            return Some(dir.clone());
        }
        let cwd = env::current_dir().ok()?;
        find_plot_dir(&cwd)
    }

    /// Load the effective configuration (defaults, file, environment).
    pub fn load_config(&self) -> Result<PlotConfig> {
        let plot_dir = self.resolve_plot_dir();
        debug!(plot_dir = ?plot_dir, "loading configuration");
        load_config(plot_dir.as_deref()).with_context(|| match &plot_dir {
            Some(dir) => format!("failed to load configuration from {}", dir.display()),
            None => "failed to load configuration".to_string(),
        })
    }
}
