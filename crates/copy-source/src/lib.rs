//! Synthetic rows for bulk-copy stress testing.
//!
//! This crate provides the `RowSource`, a pull-based generator that yields
//! `(id, payload)` rows for one bulk-copy batch, and the shared `Payload`
//! buffer attached to every row.
//!
//! # Architecture
//!
//! ```text
//! generate_payload(json_size)
//!        │
//!        ▼
//!    Payload (one allocation, shared)
//!        │
//!        ▼
//! ┌─────────────────┐
//! │   RowSource     │   one per batch
//! │                 │
//! │  - max_rows     │
//! │  - counter      │
//! └────────┬────────┘
//!          │
//!          ▼
//!    Row { id: 1..=max_rows, payload }
//! ```
//!
//! # Example
//!
//! ```rust
//! use copy_source::{generate_payload, RowSource};
//!
//! let payload = generate_payload(16).unwrap();
//! let ids: Vec<i64> = RowSource::new(3, payload).map(|row| row.id).collect();
//! assert_eq!(ids, vec![1, 2, 3]);
//! ```

pub mod payload;
pub mod row_source;

pub use payload::{generate_payload, Payload, PayloadError, FILLER};
pub use row_source::{Row, RowSource, SourceState, DEFAULT_PROGRESS_INTERVAL};
