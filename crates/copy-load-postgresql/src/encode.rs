//! Binary encodings for the generated column values.
//!
//! The binary COPY format needs values encoded for the exact column type, so
//! both wrappers adapt to whatever the target table declares.

use bytes::{BufMut, BytesMut};
use copy_source::Payload;
use postgres_types::{to_sql_checked, IsNull, ToSql, Type};
use std::error::Error;
use std::fmt;

/// Row identity, written as INT2, INT4 or INT8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowId(pub i64);

impl RowId {
    /// Largest id a column of type `ty` can hold, or `None` if the type is not an integer.
    pub fn max_for(ty: &Type) -> Option<i64> {
        match *ty {
            Type::INT2 => Some(i64::from(i16::MAX)),
            Type::INT4 => Some(i64::from(i32::MAX)),
            Type::INT8 => Some(i64::MAX),
            _ => None,
        }
    }
}

impl ToSql for RowId {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match *ty {
            Type::INT2 => i16::try_from(self.0)?.to_sql(ty, out),
            Type::INT4 => i32::try_from(self.0)?.to_sql(ty, out),
            _ => self.0.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        Self::max_for(ty).is_some()
    }

    to_sql_checked!();
}

/// Pre-encoded JSON document, written without re-serializing.
#[derive(Clone, Copy)]
pub struct JsonPayload<'a>(pub &'a Payload);

impl fmt::Debug for JsonPayload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonPayload")
            .field("len", &self.0.len())
            .finish()
    }
}

/// JSONB binary format version.
const JSONB_VERSION: u8 = 1;

impl ToSql for JsonPayload<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        if *ty == Type::JSONB {
            out.put_u8(JSONB_VERSION);
        }
        out.put_slice(self.0.as_bytes());
        Ok(IsNull::No)
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::JSON | Type::JSONB | Type::TEXT | Type::VARCHAR | Type::BYTEA
        )
    }

    to_sql_checked!();
}
