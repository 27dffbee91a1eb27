//! Discovery of the `.xyzplot/` project directory.
//!
//! The directory holds `config.yaml`. It is found by walking up from the
//! working directory, unless `XYZPLOT_DIR` names one explicitly.

use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// The name of the project metadata directory.
pub const PLOT_DIR_NAME: &str = ".xyzplot";

/// Environment variable naming the project directory directly.
pub const PLOT_DIR_ENV: &str = "XYZPLOT_DIR";

/// Find the `.xyzplot/` directory for `start`.
///
/// `XYZPLOT_DIR` wins when it names an existing directory; otherwise the
/// nearest `.xyzplot/` in `start` or one of its ancestors is returned.
pub fn find_plot_dir(start: &Path) -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(PLOT_DIR_ENV).map(PathBuf::from) {
        if dir.is_dir() {
            return Some(dir);
        }
    }
    find_in_ancestors(start)
}

/// Walk up from `start` looking for `.xyzplot/`, ignoring the environment.
pub fn find_in_ancestors(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().ok()?;
    start
        .ancestors()
        .map(|dir| dir.join(PLOT_DIR_NAME))
        .find(|candidate| candidate.is_dir())
}

/// Create `.xyzplot/` under `path` (or `path` itself if it already ends in
/// `.xyzplot`) and return it.
pub fn ensure_plot_dir(path: &Path) -> Result<PathBuf, ConfigError> {
    let dir = if path.ends_with(PLOT_DIR_NAME) {
        path.to_path_buf()
    } else {
        path.join(PLOT_DIR_NAME)
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
