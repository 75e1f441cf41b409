use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    IsbnEnrichment,
    UrlEnrichment,
    CatalogMerge,
    ReportAssembly,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::IsbnEnrichment => write!(f, "ISBN enrichment"),
            Stage::UrlEnrichment => write!(f, "URL enrichment"),
            Stage::CatalogMerge => write!(f, "catalog merge"),
            Stage::ReportAssembly => write!(f, "report assembly"),
        }
    }
}

/// Error type covering the different failure cases that can occur while the
/// inputs are loaded, joined, or written out as a workbook.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Wrapper for IO failures such as reading files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a delimited file cannot be opened, or when a concordance
    /// record is malformed. Unparseable export rows are reported as
    /// [`ReportError::Format`] instead.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when a JSON concordance cannot be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Raised when a file parses but does not hold usable tabular data.
    #[error("cannot read {path} as tabular data: {message}")]
    Format { path: PathBuf, message: String },

    /// Raised when the bookstore workbook lacks the requested sheet.
    #[error("workbook {path} has no sheet named '{sheet}'")]
    MissingSheet { path: PathBuf, sheet: String },

    /// Raised when a required column is absent from a record set.
    #[error("{record_set} is missing required column '{column}'")]
    MissingColumn { record_set: String, column: String },

    /// Raised when positional or per-view column assumptions do not hold.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Raised when the output workbook or an export cannot be written.
    #[error("cannot write {path}: {message}")]
    Write { path: PathBuf, message: String },

    /// Raised when the configuration file is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),

    /// Wraps an error with the pipeline stage it happened in.
    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<ReportError>,
    },
}

impl ReportError {
    pub(crate) fn missing_column(record_set: &str, column: &str) -> Self {
        ReportError::MissingColumn {
            record_set: record_set.to_string(),
            column: column.to_string(),
        }
    }

    /// Attaches the stage name unless the error already carries one.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            already @ ReportError::Stage { .. } => already,
            other => ReportError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Returns the innermost error, skipping stage wrappers.
    pub fn root(&self) -> &ReportError {
        match self {
            ReportError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<toml::de::Error> for ReportError {
    fn from(error: toml::de::Error) -> Self {
        ReportError::Config(error.to_string())
    }
}
