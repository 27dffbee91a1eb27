//! `xyzplot version` -- report the release and the tag stamped into output.

use anyhow::Result;
use serde::Serialize;

use xyzplot_engine::generate::GENERATED_BY;

use crate::context::RuntimeContext;
use crate::output::output_json;

/// What `xyzplot version` reports.
#[derive(Debug, Serialize)]
struct VersionInfo {
    version: &'static str,
    /// `meta.generated_by` in every written settings file.
    generated_by: &'static str,
    /// Set by release builds through `XYZPLOT_BUILD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    build: Option<&'static str>,
    target: String,
}

impl VersionInfo {
    fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            generated_by: GENERATED_BY,
            build: option_env!("XYZPLOT_BUILD"),
            target: format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }

    fn line(&self) -> String {
        let mut line = format!("xyzplot version {}", self.version);
        if let Some(build) = self.build {
            line.push_str(&format!(" ({build})"));
        }
        line.push_str(&format!(" {}, stamps '{}'", self.target, self.generated_by));
        line
    }
}

/// Execute the `xyzplot version` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let info = VersionInfo::current();
    if ctx.json {
        output_json(&info);
    } else {
        println!("{}", info.line());
    }
    Ok(())
}
