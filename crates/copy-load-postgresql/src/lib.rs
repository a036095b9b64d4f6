//! Bulk-copy loader for PostgreSQL-compatible databases.
//!
//! Connects, truncates the target table, builds one shared JSON payload and
//! streams synthetic rows into the table with binary `COPY ... FROM STDIN`,
//! either as one batch or as several sequential batches.

pub mod args;
pub mod config;
pub mod encode;
pub mod error;
pub mod loader;
pub mod sink;

pub use args::{CommonCopyArgs, RepeatedBatchArgs, SingleBatchArgs};
pub use config::LoadConfig;
pub use error::CopyLoadError;
pub use loader::{copy_batch, load_batches, CopyLoader, LoadMetrics};
pub use sink::{quote_identifier, CopySink, CopyTarget, PostgreSQLTarget, TableLayout};
