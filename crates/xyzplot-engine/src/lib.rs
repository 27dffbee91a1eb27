//! Sweep engine for xyzplot.
//!
//! Turns a base settings document and up to three axis selections into one
//! derived document per combination of axis values:
//!
//! - [`expr`] parses value expressions (`1-5`, `0-1 [5]`, `a, b, c`).
//! - [`resolve`] collects an axis's expressions into a deduplicated set.
//! - [`overrides`] writes a value into a document copy.
//! - [`common`] builds the shared overrides applied before the sweep.
//! - [`naming`] renders filenames from a template.
//! - [`generate`] runs the Cartesian product.

pub mod common;
pub mod expr;
pub mod generate;
pub mod naming;
pub mod overrides;
pub mod resolve;
pub mod types;

pub use expr::{parse, parse_expression};
pub use generate::{GenerateOptions, GenerationRequest, generate};
pub use resolve::resolve;
pub use types::{
    ExprWarning, GeneratedArtifact, GeneratedFile, GenerationReport, PlotError, Provenance,
    ResolvedAxis, Warning,
};
