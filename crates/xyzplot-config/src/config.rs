//! Configuration types and loading.
//!
//! [`PlotConfig`] mirrors `.xyzplot/config.yaml`. Loading layers three
//! sources, later ones winning: built-in defaults, the YAML file, and
//! `XYZPLOT_*` environment variables (`XYZPLOT_NAMING__TEMPLATE` sets
//! `naming.template`).

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use xyzplot_core::fields::FieldCatalog;
use xyzplot_core::naming::NamingOptions;

/// File name of the configuration inside `.xyzplot/`.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Prefix of environment variables that override configuration values.
pub const ENV_PREFIX: &str = "XYZPLOT_";

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// The configuration could not be serialized to YAML.
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// The layered configuration could not be extracted.
    #[error("invalid configuration: {0}")]
    Figment(Box<figment::Error>),

    /// A configuration value was invalid.
    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Where generated files are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory, relative to the working directory.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Place each Z value's files in a `z_<param>_<value>/` directory.
    #[serde(default)]
    pub group_by_z: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            group_by_z: false,
        }
    }
}

fn default_output_dir() -> String {
    "plot_settings".to_string()
}

/// The full configuration, corresponding to `.xyzplot/config.yaml`.
///
/// Every section has defaults, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotConfig {
    #[serde(default)]
    pub naming: NamingOptions,

    /// Field classification lists.
    #[serde(default)]
    pub fields: FieldCatalog,

    #[serde(default)]
    pub output: OutputConfig,

    /// Recorded in each document's `meta.generated_by`.
    #[serde(default = "default_generated_by")]
    pub generated_by: String,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            naming: NamingOptions::default(),
            fields: FieldCatalog::default(),
            output: OutputConfig::default(),
            generated_by: default_generated_by(),
        }
    }
}

fn default_generated_by() -> String {
    "xyzplot".to_string()
}

impl PlotConfig {
    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<()> {
        let ext = &self.naming.extension;
        if !ext.is_empty() && !ext.starts_with('.') {
            return Err(ConfigError::InvalidValue {
                key: "naming.extension".into(),
                reason: format!("'{}' must start with '.'", ext),
            });
        }
        if let Some(template) = &self.naming.template {
            if template.contains('/') || template.contains('\\') {
                return Err(ConfigError::InvalidValue {
                    key: "naming.template".into(),
                    reason: "templates cannot contain path separators".into(),
                });
            }
        }
        if self.fields.prompts_field.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "fields.prompts_field".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.output.dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "output.dir".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Build the layered configuration sources for a `.xyzplot/` directory.
///
/// A missing or blank config file contributes nothing.
pub fn figment(plot_dir: Option<&Path>) -> Result<Figment> {
    let mut figment = Figment::from(Serialized::defaults(PlotConfig::default()));

    if let Some(dir) = plot_dir {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            if !content.trim().is_empty() {
                figment = figment.merge(Yaml::string(&content));
            }
        }
    }

    Ok(figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["dir"]).split("__")))
}

/// Load configuration from `config.yaml` inside the given `.xyzplot/`
/// directory, with environment overrides applied.
///
/// `None`, a missing file, and an empty file all yield the defaults (plus
/// any environment overrides).
pub fn load_config(plot_dir: Option<&Path>) -> Result<PlotConfig> {
    let config: PlotConfig = figment(plot_dir)?.extract()?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to `config.yaml` inside the given `.xyzplot/`
/// directory, creating the directory if needed.
pub fn save_config(plot_dir: &Path, config: &PlotConfig) -> Result<()> {
    std::fs::create_dir_all(plot_dir)?;
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(plot_dir.join(CONFIG_FILE_NAME), yaml)?;
    Ok(())
}
