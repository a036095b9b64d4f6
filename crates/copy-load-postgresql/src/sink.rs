//! Destinations that accept generated rows through a COPY stream.

use crate::encode::{JsonPayload, RowId};
use crate::error::{BoxError, CopyLoadError};
use copy_source::Row;
use postgres_types::{ToSql, Type};
use std::pin::Pin;
use tokio_postgres::binary_copy::BinaryCopyInWriter;
use tokio_postgres::Client;

/// Identity column of the target table.
pub const ID_COLUMN: &str = "id";

/// Payload column of the target table.
pub const DATA_COLUMN: &str = "data";

/// One open COPY stream. A sink receives the rows of exactly one batch.
#[async_trait::async_trait]
pub trait CopySink: Send {
    /// Append one row to the stream.
    async fn write_row(&mut self, row: &Row) -> Result<(), BoxError>;

    /// Complete the stream and return the number of rows the server accepted.
    async fn finish(&mut self) -> Result<u64, BoxError>;
}

/// Opens a fresh `CopySink` for each batch.
#[async_trait::async_trait]
pub trait CopyTarget: Send + Sync {
    type Sink: CopySink;

    async fn open(&self, batch: u64) -> Result<Self::Sink, BoxError>;
}

/// Quote a possibly schema-qualified identifier (`schema.table`).
///
/// Names that already contain a double quote are taken as quoted SQL and
/// returned unchanged, so `"odd.name"` or `public."Blobs"` pass through.
pub fn quote_identifier(name: &str) -> String {
    if name.contains('"') {
        return name.to_string();
    }
    name.split('.')
        .map(|part| format!("\"{part}\""))
        .collect::<Vec<_>>()
        .join(".")
}

/// Column types of the target table, as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub table: String,
    pub id_type: Type,
    pub data_type: Type,
}

impl TableLayout {
    /// Build a layout, rejecting column types the encoders cannot write and
    /// id columns too narrow to hold ids up to `max_rows`.
    pub fn new(
        table: &str,
        id_type: Type,
        data_type: Type,
        max_rows: i64,
    ) -> Result<Self, CopyLoadError> {
        let Some(id_limit) = RowId::max_for(&id_type) else {
            return Err(CopyLoadError::UnsupportedColumnType {
                column: ID_COLUMN.to_string(),
                ty: id_type.name().to_string(),
            });
        };
        if max_rows > id_limit {
            return Err(CopyLoadError::IdOutOfRange {
                column: ID_COLUMN.to_string(),
                ty: id_type.name().to_string(),
                max_rows,
                limit: id_limit,
            });
        }
        if !<JsonPayload<'_> as ToSql>::accepts(&data_type) {
            return Err(CopyLoadError::UnsupportedColumnType {
                column: DATA_COLUMN.to_string(),
                ty: data_type.name().to_string(),
            });
        }

        Ok(Self {
            table: table.to_string(),
            id_type,
            data_type,
        })
    }

    /// Ask the server for the types of the `id` and `data` columns.
    pub async fn describe(
        client: &Client,
        table: &str,
        max_rows: i64,
    ) -> Result<Self, CopyLoadError> {
        let sql = format!(
            "SELECT {}, {} FROM {} LIMIT 0",
            quote_identifier(ID_COLUMN),
            quote_identifier(DATA_COLUMN),
            quote_identifier(table)
        );
        let statement = client
            .prepare(&sql)
            .await
            .map_err(|source| CopyLoadError::Describe {
                table: table.to_string(),
                source,
            })?;

        match statement.columns() {
            [id, data] => Self::new(
                table,
                id.type_().clone(),
                data.type_().clone(),
                max_rows,
            ),
            columns => Err(CopyLoadError::Config(format!(
                "expected 2 columns from {table}, got {}",
                columns.len()
            ))),
        }
    }

    /// COPY statement streaming both columns in binary format.
    pub fn copy_statement(&self) -> String {
        format!(
            "COPY {} ({}, {}) FROM STDIN BINARY",
            quote_identifier(&self.table),
            quote_identifier(ID_COLUMN),
            quote_identifier(DATA_COLUMN)
        )
    }

    fn column_types(&self) -> [Type; 2] {
        [self.id_type.clone(), self.data_type.clone()]
    }
}

/// Binary COPY into a PostgreSQL-compatible table.
pub struct PostgreSQLTarget<'a> {
    client: &'a Client,
    layout: TableLayout,
}

impl<'a> PostgreSQLTarget<'a> {
    pub fn new(client: &'a Client, layout: TableLayout) -> Self {
        Self { client, layout }
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }
}

#[async_trait::async_trait]
impl CopyTarget for PostgreSQLTarget<'_> {
    type Sink = PostgreSQLCopySink;

    async fn open(&self, batch: u64) -> Result<Self::Sink, BoxError> {
        let statement = self.layout.copy_statement();
        tracing::debug!("Opening COPY stream for batch {}: {}", batch, statement);

        let sink = self.client.copy_in(statement.as_str()).await?;
        let writer = BinaryCopyInWriter::new(sink, &self.layout.column_types());

        Ok(PostgreSQLCopySink {
            writer: Box::pin(writer),
        })
    }
}

/// An open binary COPY stream.
pub struct PostgreSQLCopySink {
    writer: Pin<Box<BinaryCopyInWriter>>,
}

#[async_trait::async_trait]
impl CopySink for PostgreSQLCopySink {
    async fn write_row(&mut self, row: &Row) -> Result<(), BoxError> {
        let id = RowId(row.id);
        let data = JsonPayload(&row.payload);
        let values: [&(dyn ToSql + Sync); 2] = [&id, &data];
        self.writer.as_mut().write(&values).await?;
        Ok(())
    }

    async fn finish(&mut self) -> Result<u64, BoxError> {
        Ok(self.writer.as_mut().finish().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("test_table"), "\"test_table\"");
        assert_eq!(quote_identifier("public.blobs"), "\"public\".\"blobs\"");
        assert_eq!(quote_identifier("\"odd.name\""), "\"odd.name\"");
        assert_eq!(quote_identifier("public.\"Blobs\""), "public.\"Blobs\"");
    }

    #[test]
    fn test_copy_statement() {
        let layout = TableLayout::new("test_table", Type::INT8, Type::JSONB, 10).unwrap();
        assert_eq!(
            layout.copy_statement(),
            "COPY \"test_table\" (\"id\", \"data\") FROM STDIN BINARY"
        );
    }

    #[test]
    fn test_layout_rejects_unsupported_types() {
        let result = TableLayout::new("t", Type::TEXT, Type::JSON, 10);
        assert!(matches!(
            result,
            Err(CopyLoadError::UnsupportedColumnType { ref column, .. }) if column == "id"
        ));

        let result = TableLayout::new("t", Type::INT4, Type::INT4, 10);
        assert!(matches!(
            result,
            Err(CopyLoadError::UnsupportedColumnType { ref column, .. }) if column == "data"
        ));

        assert!(TableLayout::new("t", Type::INT4, Type::TEXT, 10).is_ok());
    }

    #[test]
    fn test_layout_rejects_narrow_id_column() {
        let result = TableLayout::new("t", Type::INT2, Type::JSON, 40_000);
        match result {
            Err(CopyLoadError::IdOutOfRange {
                ref column,
                max_rows,
                limit,
                ..
            }) => {
                assert_eq!(column, "id");
                assert_eq!(max_rows, 40_000);
                assert_eq!(limit, i64::from(i16::MAX));
            }
            other => panic!("expected id range error, got {other:?}"),
        }

        assert!(TableLayout::new("t", Type::INT2, Type::JSON, i64::from(i16::MAX)).is_ok());
        assert!(TableLayout::new("t", Type::INT4, Type::JSON, 40_000).is_ok());
        assert!(TableLayout::new("t", Type::INT4, Type::JSON, i64::from(i32::MAX) + 1).is_err());
        assert!(TableLayout::new("t", Type::INT8, Type::JSON, i64::MAX).is_ok());
        // Empty batches fit any id column
        assert!(TableLayout::new("t", Type::INT2, Type::JSON, -1).is_ok());
    }
}
