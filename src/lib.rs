//! copy-stress library
//!
//! Load-tests the bulk COPY ingestion path of PostgreSQL-compatible databases
//! by streaming rows that each carry one large, shared JSON document.
//!
//! # CLI Usage
//!
//! ```bash
//! # One COPY with a million rows
//! copy-stress single --max-rows 1000000 --json-size 67108864 \
//!   --db "postgresql://root@localhost:26257/defaultdb?sslmode=disable"
//!
//! # Ten sequential COPYs of 1000 rows each
//! copy-stress repeat --insert-times 10 --max-rows 1000
//! ```
//!
//! The target table must exist:
//!
//! ```sql
//! CREATE TABLE test_table (id INT, data JSON);
//! ```

pub mod cli;
pub mod logging;
pub mod run;

pub use cli::{Cli, Commands};
pub use logging::mask_connection_password;
pub use run::run_copy;
