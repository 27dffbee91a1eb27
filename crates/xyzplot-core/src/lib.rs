//! Core types for the xyzplot system.
//!
//! This crate holds the domain model shared by the engine, the configuration
//! layer, and the command-line host: parsed axis values, axis selections,
//! field classification, prompt keyframes, naming options, and the loader for
//! base settings documents.

pub mod axis;
pub mod fields;
pub mod naming;
pub mod prompts;
pub mod settings;
pub mod value;
