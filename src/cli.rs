//! Command-line definitions.

use clap::{Parser, Subcommand};
use copy_load_postgresql::{RepeatedBatchArgs, SingleBatchArgs};

#[derive(Parser, Debug)]
#[command(name = "copy-stress")]
#[command(about = "Stress-test bulk COPY ingestion with large JSON rows")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy every row in a single COPY invocation
    Single(SingleBatchArgs),

    /// Copy the same number of rows several times, one COPY per batch
    Repeat(RepeatedBatchArgs),
}
