//! CatalogProvider trait definition.
//!
//! The CatalogProvider trait abstracts over where catalog facts come from.
//! The primary implementation is [`PgCatalogProvider`](super::PgCatalogProvider),
//! which queries the PostgreSQL system catalog; tests supply in-memory
//! fixtures through the same trait.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use super::error::CatalogResult;

/// Answers structural questions about one table at a time.
///
/// Any relational store exposing equivalent catalog facts (columns, primary
/// keys, unique indexes, foreign keys, sequence bindings) can implement
/// this trait. All answers describe structure only; row data is never
/// touched.
///
/// Missing data is absence, not an error: a table without unique indexes
/// yields an empty map, a primary key with no matching sequence yields
/// `None`. Errors are reserved for failed catalog queries, which abort the
/// whole run.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// The fixed, externally supplied list of tables to model, in assembly
    /// order. Not derived from catalog discovery.
    async fn target_tables(&self) -> CatalogResult<Vec<String>>;

    /// Column names of `table`, ordered by ordinal position.
    async fn columns(&self, table: &str) -> CatalogResult<Vec<String>>;

    /// Columns forming the primary key of `table` (empty if none).
    async fn primary_key_columns(&self, table: &str) -> CatalogResult<BTreeSet<String>>;

    /// The sequence backing the primary key of `table`, if the primary key
    /// is the single column `id` at ordinal position 1 and a sequence
    /// matches the constraint by naming convention.
    ///
    /// This is a naming heuristic, not a relational fact; diverging local
    /// conventions produce false negatives, reported as `None`.
    async fn primary_key_sequence(&self, table: &str) -> CatalogResult<Option<String>>;

    /// Unique indexes of `table` by name, each with the columns it covers.
    /// The primary-key index is excluded.
    async fn unique_indexes(&self, table: &str)
        -> CatalogResult<BTreeMap<String, BTreeSet<String>>>;

    /// Names of the foreign-key constraints of `table`.
    async fn foreign_key_names(&self, table: &str) -> CatalogResult<Vec<String>>;

    /// Local column -> referenced column mapping of one foreign-key
    /// constraint.
    async fn foreign_key_columns(
        &self,
        table: &str,
        constraint: &str,
    ) -> CatalogResult<BTreeMap<String, String>>;

    /// The table referenced by one foreign-key constraint. Empty when the
    /// catalog returns no row for the constraint.
    async fn foreign_key_referenced_table(
        &self,
        table: &str,
        constraint: &str,
    ) -> CatalogResult<String>;
}
