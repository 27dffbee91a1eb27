//! Project configuration for xyzplot.
//!
//! Handles `.xyzplot/config.yaml`: discovering the `.xyzplot/` directory,
//! loading the file with environment overrides layered on top, and writing
//! defaults for a new project.

pub mod config;
pub mod plot_dir;
