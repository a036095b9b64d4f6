//! Command runner.

use anyhow::Context;
use copy_load_postgresql::{CopyLoader, LoadConfig};
use copy_source::generate_payload;

use crate::cli::Commands;
use crate::logging::mask_connection_password;

/// Resolve the configuration for `command` and run it.
pub async fn run_copy(command: Commands) -> anyhow::Result<()> {
    let config = match &command {
        Commands::Single(args) => LoadConfig::from(args),
        Commands::Repeat(args) => LoadConfig::from(args),
    };
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        "Copying {} rows x {} batches into '{}' ({} byte JSON payload)",
        config.max_rows,
        config.insert_times,
        config.table,
        config.json_size
    );
    tracing::info!(
        "Connection: {}",
        mask_connection_password(&config.connection_string)
    );

    if config.dry_run {
        return dry_run(&config);
    }

    let loader = CopyLoader::connect(config)
        .await
        .context("Failed to connect to database")?;
    let metrics = loader.run().await.context("Bulk copy failed")?;

    let expected = loader.config().expected_rows();
    if metrics.rows_inserted != expected {
        tracing::warn!(
            "Server reported {} rows copied, expected {}",
            metrics.rows_inserted,
            expected
        );
    }

    Ok(())
}

fn dry_run(config: &LoadConfig) -> anyhow::Result<()> {
    let payload =
        generate_payload(config.json_size).context("Failed to generate JSON payload")?;

    tracing::info!("[DRY-RUN] Payload: {} encoded bytes", payload.len());
    tracing::info!(
        "[DRY-RUN] Would truncate '{}': {}",
        config.table,
        config.truncate
    );
    tracing::info!(
        "[DRY-RUN] Would copy {} rows in {} batches",
        config.expected_rows(),
        config.insert_times
    );
    tracing::info!("[DRY-RUN] Configuration validated successfully");
    Ok(())
}
