//! Error types for the bulk-copy loader.

use copy_source::PayloadError;
use thiserror::Error;

/// Boxed error produced by a copy sink.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during a loading run. Every variant aborts the run.
#[derive(Error, Debug)]
pub enum CopyLoadError {
    /// Connection could not be established.
    #[error("Unable to connect to database: {0}")]
    Connect(#[source] tokio_postgres::Error),

    /// TRUNCATE failed.
    #[error("failed to truncate table {table}: {source}")]
    Truncate {
        table: String,
        #[source]
        source: tokio_postgres::Error,
    },

    /// The target table's columns could not be described.
    #[error("failed to describe table {table}: {source}")]
    Describe {
        table: String,
        #[source]
        source: tokio_postgres::Error,
    },

    /// A column type has no binary encoding for the generated values.
    #[error("column '{column}' has unsupported type {ty}")]
    UnsupportedColumnType { column: String, ty: String },

    /// The id column cannot hold the largest generated id.
    #[error("column '{column}' of type {ty} cannot hold ids up to {max_rows} (limit {limit})")]
    IdOutOfRange {
        column: String,
        ty: String,
        max_rows: i64,
        limit: i64,
    },

    /// The shared payload could not be built.
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// The COPY stream failed part-way through a batch.
    #[error("failed to copy at {rows_inserted} rows (batch {batch}): {source}")]
    Copy {
        batch: u64,
        rows_inserted: u64,
        #[source]
        source: BoxError,
    },

    /// Query error outside the copy phases.
    #[error("PostgreSQL error: {0}")]
    PostgreSQL(#[from] tokio_postgres::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CopyLoadError {
    /// Rows written in the failing batch before a copy error, if any.
    pub fn rows_inserted(&self) -> Option<u64> {
        match self {
            CopyLoadError::Copy { rows_inserted, .. } => Some(*rows_inserted),
            _ => None,
        }
    }
}
