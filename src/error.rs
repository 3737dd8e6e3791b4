//! Error types for ingestion, configuration and the enrichment pipeline.
//!
//! Only schema-level problems are errors. Unclassifiable addresses,
//! unparsable dates and missing categorical cells are ordinary data states
//! and never surface here.

use std::{io, path::PathBuf};

use crate::record::Field;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A required column is absent from the input schema altogether.
    #[error("required field `{field}` is absent from the input schema")]
    MissingField { field: Field },
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to open {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("input has {rows} rows, cannot skip {skip} and still read a header row")]
    HeaderRowOutOfRange { skip: usize, rows: usize },

    #[error("column `{header}` for field `{field}` not found in header row")]
    MissingColumn { field: Field, header: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
