//! Bulk-copy loader: truncate, generate the payload, stream batches.

use crate::config::LoadConfig;
use crate::error::CopyLoadError;
use crate::sink::{quote_identifier, CopySink, CopyTarget, PostgreSQLTarget, TableLayout};
use copy_source::{generate_payload, Payload, RowSource};
use std::time::{Duration, Instant};
use tokio_postgres::{Client, NoTls};
use tracing::{debug, info};

/// Metrics from a loading run.
#[derive(Debug, Clone, Default)]
pub struct LoadMetrics {
    /// Rows the server reported as copied, across all batches.
    pub rows_inserted: u64,
    /// Number of completed COPY invocations.
    pub batch_count: u64,
    /// Encoded size of the shared payload.
    pub payload_bytes: u64,
    /// Time spent in the copy loop.
    pub total_duration: Duration,
}

impl LoadMetrics {
    /// Calculate rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.rows_inserted as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Payload bytes streamed per second.
    pub fn bytes_per_second(&self) -> f64 {
        self.rows_per_second() * self.payload_bytes as f64
    }
}

/// Drain one row source into one sink.
///
/// On failure the error carries the number of rows written before the
/// failing one.
pub async fn copy_batch<S: CopySink>(
    sink: &mut S,
    source: RowSource,
    batch: u64,
) -> Result<u64, CopyLoadError> {
    let mut rows_inserted = 0u64;

    for row in source {
        sink.write_row(&row)
            .await
            .map_err(|source| CopyLoadError::Copy {
                batch,
                rows_inserted,
                source,
            })?;
        rows_inserted += 1;
    }

    sink.finish().await.map_err(|source| CopyLoadError::Copy {
        batch,
        rows_inserted,
        source,
    })
}

/// Copy `config.insert_times` batches one after another, each from a fresh
/// row source sharing `payload`. Stops at the first failing batch.
pub async fn load_batches<T: CopyTarget>(
    target: &T,
    payload: &Payload,
    config: &LoadConfig,
) -> Result<LoadMetrics, CopyLoadError> {
    let start_time = Instant::now();
    let mut metrics = LoadMetrics {
        payload_bytes: payload.len() as u64,
        ..Default::default()
    };

    for batch in 1..=config.insert_times {
        debug!(
            "Starting batch {}/{} ({} rows)",
            batch, config.insert_times, config.max_rows
        );

        let mut sink = target
            .open(batch)
            .await
            .map_err(|source| CopyLoadError::Copy {
                batch,
                rows_inserted: 0,
                source,
            })?;

        let source = RowSource::new(config.max_rows, payload.clone())
            .with_progress_interval(config.progress_interval);
        let copied = copy_batch(&mut sink, source, batch).await?;

        metrics.rows_inserted += copied;
        metrics.batch_count += 1;

        if config.insert_times > 1 {
            info!(
                "batch {}/{} complete: copied {} rows",
                batch, config.insert_times, copied
            );
        }
    }

    metrics.total_duration = start_time.elapsed();
    Ok(metrics)
}

/// Loader bound to one database connection and one configuration.
pub struct CopyLoader {
    client: Client,
    config: LoadConfig,
}

impl CopyLoader {
    /// Validate the configuration and connect.
    pub async fn connect(config: LoadConfig) -> Result<Self, CopyLoadError> {
        config.validate()?;

        info!("connecting to db");
        let (client, connection) = tokio_postgres::connect(&config.connection_string, NoTls)
            .await
            .map_err(CopyLoadError::Connect)?;

        // Spawn the connection task
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });
        info!("connected to db");

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Truncate the target table (delete all rows).
    pub async fn truncate_table(&self) -> Result<(), CopyLoadError> {
        let sql = format!("TRUNCATE TABLE {}", quote_identifier(&self.config.table));
        self.client
            .batch_execute(&sql)
            .await
            .map_err(|source| CopyLoadError::Truncate {
                table: self.config.table.clone(),
                source,
            })?;
        info!("table truncated");
        Ok(())
    }

    /// Get the row count of the target table.
    pub async fn row_count(&self) -> Result<u64, CopyLoadError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}",
            quote_identifier(&self.config.table)
        );
        let row = self.client.query_one(&sql, &[]).await?;
        let count: i64 = row.get(0);
        Ok(count as u64)
    }

    /// Run the whole procedure: truncate, generate the payload, copy every batch.
    pub async fn run(&self) -> Result<LoadMetrics, CopyLoadError> {
        // Check the columns before truncating so a bad layout leaves the table intact
        let layout =
            TableLayout::describe(&self.client, &self.config.table, self.config.max_rows).await?;
        debug!(
            "Target layout: id {}, data {}",
            layout.id_type, layout.data_type
        );

        if self.config.truncate {
            self.truncate_table().await?;
        }

        let payload = generate_payload(self.config.json_size)?;

        info!("beginning copy process");
        let target = PostgreSQLTarget::new(&self.client, layout);
        let metrics = load_batches(&target, &payload, &self.config).await?;

        info!("copied {} rows", metrics.rows_inserted);
        info!(
            "Load complete: {} rows in {} batches, {:?} ({:.2} rows/sec, {:.2} MiB/sec)",
            metrics.rows_inserted,
            metrics.batch_count,
            metrics.total_duration,
            metrics.rows_per_second(),
            metrics.bytes_per_second() / (1024.0 * 1024.0)
        );

        Ok(metrics)
    }
}
