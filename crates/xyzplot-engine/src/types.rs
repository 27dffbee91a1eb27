//! Shared engine types: warnings, errors, resolved axes, and generation output.

use chrono::{DateTime, Local, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use xyzplot_core::axis::AxisId;
use xyzplot_core::fields::FieldKind;
use xyzplot_core::value::ParsedValue;

/// A non-fatal problem found while parsing one value expression.
///
/// The expression still yields a (possibly empty) value list.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprWarning {
    #[error("step of zero in '{expr}', using the start value only")]
    ZeroStep { expr: String },

    #[error("step in '{expr}' moves away from the end value")]
    StepDirection { expr: String },

    #[error("step in '{expr}' is not a number")]
    InvalidStep { expr: String },

    #[error("range '{expr}' runs backwards; integer ranges must go from low to high")]
    EmptyIntegerRange { expr: String },

    #[error("range '{expr}' has decimal bounds; add a step '(+0.1)' or a count '[5]'")]
    NonIntegerRange { expr: String },

    #[error("range '{expr}' expands to more than {limit} values")]
    TooManyValues { expr: String, limit: usize },
}

/// A non-fatal problem recorded during a generation pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Warning {
    #[error("{axis}: {warning}")]
    Expression { axis: AxisId, warning: ExprWarning },

    #[error("{axis}: '{choice}' is not a known option for '{field}'")]
    UnknownChoice {
        axis: AxisId,
        field: String,
        choice: String,
    },

    #[error("{axis}: prompt override is not valid JSON, using it as the frame 0 text: {value}")]
    PromptOverride { axis: AxisId, value: String },

    #[error("non-object value at '{segment}' replaced while setting '{field}'")]
    ReplacedIntermediate { field: String, segment: String },

    #[error("duplicate filename: {filename}")]
    DuplicateFilename { filename: String },
}

/// Fatal errors for a generation request.
#[derive(Error, Debug)]
pub enum PlotError {
    /// An active axis has no field selected.
    #[error("{axis} parameter must be selected")]
    MissingField { axis: AxisId },

    /// An active axis resolved to no values.
    #[error("{axis} parameter '{field}' has no values defined")]
    EmptyAxis { axis: AxisId, field: String },

    #[error("failed to serialize {filename}: {source}")]
    Serialize {
        filename: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PlotError {
    /// The axis a precondition failure is about.
    pub fn axis(&self) -> Option<AxisId> {
        match self {
            Self::MissingField { axis } | Self::EmptyAxis { axis, .. } => Some(*axis),
            Self::Serialize { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlotError>;

/// An axis after its expressions have been parsed and deduplicated.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAxis {
    pub id: AxisId,
    pub field: String,
    pub kind: FieldKind,
    pub values: Vec<ParsedValue>,
    pub warnings: Vec<Warning>,
}

impl ResolvedAxis {
    pub fn empty(id: AxisId, field: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id,
            field: field.into(),
            kind,
            values: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Field and value one axis contributed to a combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisParam {
    pub param: String,
    pub value: ParsedValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotParams {
    pub x_axis: AxisParam,
    pub y_axis: AxisParam,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_axis: Option<AxisParam>,
}

impl PlotParams {
    pub fn get(&self, axis: AxisId) -> Option<&AxisParam> {
        match axis {
            AxisId::X => Some(&self.x_axis),
            AxisId::Y => Some(&self.y_axis),
            AxisId::Z => self.z_axis.as_ref(),
        }
    }
}

/// The `meta` block attached to every generated document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Provenance {
    pub generated_by: String,
    #[serde(serialize_with = "serialize_http_date")]
    pub generated_at: DateTime<Local>,
    pub plot_params: PlotParams,
}

impl Provenance {
    /// `YYYYMMDD_HHMMSS` in local time, used by the `{timestring}` placeholder.
    pub fn timestring(&self) -> String {
        self.generated_at.format("%Y%m%d_%H%M%S").to_string()
    }

    pub fn to_value(&self) -> std::result::Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

fn serialize_http_date<S: Serializer>(
    at: &DateTime<Local>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let utc = at.with_timezone(&Utc);
    serializer.serialize_str(&utc.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}

/// One combination of axis values and the document derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedArtifact {
    /// Field path to the value written by each active axis.
    pub overrides: Map<String, Value>,
    pub document: Map<String, Value>,
    pub filename: String,
    pub provenance: Provenance,
}

/// A filename and its serialized content, ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedFile {
    pub filename: String,
    pub content: String,
}

/// Everything a generation pass produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub artifacts: Vec<GeneratedArtifact>,
    /// Resolved X, Y, and (when enabled) Z axes.
    pub axes: Vec<ResolvedAxis>,
    /// Deduplicated warnings in the order they were first seen.
    pub warnings: Vec<Warning>,
    /// Filenames rendered more than once.
    pub duplicates: Vec<String>,
}

impl GenerationReport {
    /// Serialize every document as pretty JSON. The first failure aborts.
    pub fn to_files(&self) -> Result<Vec<GeneratedFile>> {
        self.artifacts
            .iter()
            .map(|artifact| {
                serde_json::to_string_pretty(&artifact.document)
                    .map(|content| GeneratedFile {
                        filename: artifact.filename.clone(),
                        content,
                    })
                    .map_err(|source| PlotError::Serialize {
                        filename: artifact.filename.clone(),
                        source,
                    })
            })
            .collect()
    }

    pub(crate) fn push_warning(&mut self, warning: Warning) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }
}
