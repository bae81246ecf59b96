//! # Schemaprobe
//!
//! Builds an in-memory structural model of a fixed set of database tables
//! from the database's own catalog metadata and elects, per table, a
//! "main unique index": the unique index whose columns best serve as a
//! stable, human-meaningful natural key instead of a surrogate
//! sequence-generated id.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │             Settings (tables + connection)              │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [catalog]
//! ┌─────────────────────────────────────────────────────────┐
//! │      CatalogProvider (PostgreSQL system catalog)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [assembler, phase 1]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Table entities + provisional main-index election    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [assembler, phase 2]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Cross-table correction: revoke foreign-surrogate keys │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The result feeds schema-synchronization and data-migration tooling that
//! matches rows by meaning rather than by surrogate id.
//!
//! ## Example
//!
//! ```ignore
//! use schemaprobe::{PgCatalogProvider, SchemaAssembler, Settings};
//!
//! let settings = Settings::from_file("schemaprobe.toml")?;
//! let provider = PgCatalogProvider::connect(&settings).await?;
//! let tables = SchemaAssembler::new(provider).assemble().await?;
//!
//! for table in &tables {
//!     println!("{}: {:?}", table.name, table.main_unique_index);
//! }
//! ```

pub mod assembler;
pub mod catalog;
pub mod config;
pub mod model;

// Export the main entry points at crate root for convenience
pub use assembler::{elect_main_index, revoke_surrogate_keys, SchemaAssembler};
pub use catalog::{
    CatalogError, CatalogProvider, CatalogResult, ConventionalNaming, PgCatalogProvider,
    SequenceNaming,
};
pub use config::{Settings, SettingsError};
pub use model::{Reference, Table, UniqueIndex};
