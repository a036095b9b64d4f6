//! Immutable run configuration.

use crate::args::{CommonCopyArgs, RepeatedBatchArgs, SingleBatchArgs};
use crate::error::CopyLoadError;
use copy_source::DEFAULT_PROGRESS_INTERVAL;

/// Parameters for one loading run, resolved once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadConfig {
    pub connection_string: String,
    pub table: String,
    /// Rows per batch; zero or negative copies empty batches
    pub max_rows: i64,
    /// Number of sequential batches
    pub insert_times: u64,
    /// Filler characters in the JSON payload
    pub json_size: usize,
    pub progress_interval: u64,
    pub truncate: bool,
    pub dry_run: bool,
}

impl LoadConfig {
    /// Configuration for a single batch of `max_rows` rows.
    pub fn new(connection_string: impl Into<String>, max_rows: i64, json_size: usize) -> Self {
        Self {
            connection_string: connection_string.into(),
            table: "test_table".to_string(),
            max_rows,
            insert_times: 1,
            json_size,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            truncate: true,
            dry_run: false,
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_insert_times(mut self, insert_times: u64) -> Self {
        self.insert_times = insert_times;
        self
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    fn from_common(common: &CommonCopyArgs, insert_times: u64) -> Self {
        Self {
            connection_string: common.db_url.clone(),
            table: common.table.clone(),
            max_rows: common.max_rows,
            insert_times,
            json_size: common.json_size,
            progress_interval: common.progress_interval,
            truncate: !common.no_truncate,
            dry_run: common.dry_run,
        }
    }

    /// Total rows the run is expected to copy.
    pub fn expected_rows(&self) -> u64 {
        (self.max_rows.max(0) as u64).saturating_mul(self.insert_times)
    }

    /// Reject configurations that cannot describe a meaningful run.
    pub fn validate(&self) -> Result<(), CopyLoadError> {
        if self.insert_times == 0 {
            return Err(CopyLoadError::Config(
                "insert-times must be at least 1".to_string(),
            ));
        }
        if self.table.trim().is_empty() {
            return Err(CopyLoadError::Config("table name is empty".to_string()));
        }
        if self.connection_string.trim().is_empty() {
            return Err(CopyLoadError::Config(
                "connection string is empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&SingleBatchArgs> for LoadConfig {
    fn from(args: &SingleBatchArgs) -> Self {
        Self::from_common(&args.common, 1)
    }
}

impl From<&RepeatedBatchArgs> for LoadConfig {
    fn from(args: &RepeatedBatchArgs) -> Self {
        Self::from_common(&args.common, args.insert_times)
    }
}
