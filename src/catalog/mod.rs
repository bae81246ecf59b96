//! Catalog metadata access.
//!
//! This module answers structural questions about one table at a time by
//! querying the database's system catalog:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CatalogProvider                         │
//! │  - target_tables()          - unique_indexes()              │
//! │  - columns()                - foreign_key_names()           │
//! │  - primary_key_columns()    - foreign_key_columns()         │
//! │  - primary_key_sequence()   - foreign_key_referenced_table()│
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   PgCatalogProvider                         │
//! │     (information_schema + pg_catalog over sqlx::PgPool)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call is a single read against catalog metadata. Failures are
//! non-recoverable: the whole assembly run aborts, no partial model is
//! produced.

mod error;
mod naming;
mod postgres;
mod provider;

pub use error::{CatalogError, CatalogResult};
pub use naming::{ConventionalNaming, SequenceNaming};
pub use postgres::PgCatalogProvider;
pub use provider::CatalogProvider;
