//! Schema assembly and natural-key election.
//!
//! The assembler is a two-phase pipeline over a [`CatalogProvider`]:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Phase 1: per-table construction                         │
//! │  columns, primary key, sequence, unique indexes,         │
//! │  references + provisional main-index election            │
//! └──────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  Phase 2: global correction pass                         │
//! │  revoke elections that transitively describe a foreign   │
//! │  surrogate id (cross-table, needs the complete set)      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Election prefers, in order: the only unique index; the first index (by
//! name) covering a column named `label`; the first covering `name`; the
//! lexicographically smallest index name. The tie-break is deliberately
//! deterministic so the output is a pure function of the assembled set.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use crate::catalog::{CatalogProvider, CatalogResult};
use crate::model::{Reference, Table, UniqueIndex};

/// Assembles the structural model of the target tables.
pub struct SchemaAssembler<P> {
    provider: P,
}

impl<P: CatalogProvider> SchemaAssembler<P> {
    /// Create an assembler over a catalog provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Run both phases and return the final model, in target-table order.
    ///
    /// Any provider failure aborts the run; no partial model is returned.
    pub async fn assemble(&self) -> CatalogResult<Vec<Table>> {
        let mut tables = self.assemble_all().await?;
        revoke_surrogate_keys(&mut tables);
        Ok(tables)
    }

    /// Phase 1: build every table entity with its provisional election.
    pub async fn assemble_all(&self) -> CatalogResult<Vec<Table>> {
        let names = self.provider.target_tables().await?;
        let mut tables = Vec::with_capacity(names.len());
        for name in &names {
            tables.push(self.assemble_table(name).await?);
        }
        Ok(tables)
    }

    async fn assemble_table(&self, name: &str) -> CatalogResult<Table> {
        let columns = self.provider.columns(name).await?;
        let primary_key = self.provider.primary_key_columns(name).await?;
        let primary_key_sequence = self.provider.primary_key_sequence(name).await?;

        let unique_indexes: BTreeMap<String, UniqueIndex> = self
            .provider
            .unique_indexes(name)
            .await?
            .into_iter()
            .map(|(index_name, cols)| {
                let index = UniqueIndex::new(index_name.clone(), cols);
                (index_name, index)
            })
            .collect();

        let main_unique_index = elect_main_index(&unique_indexes);

        let mut references = Vec::new();
        for constraint in self.provider.foreign_key_names(name).await? {
            let column_mapping = self.provider.foreign_key_columns(name, &constraint).await?;
            let referenced = self
                .provider
                .foreign_key_referenced_table(name, &constraint)
                .await?;
            references.push(Reference::new(referenced, column_mapping));
        }

        debug!(
            table = name,
            indexes = unique_indexes.len(),
            references = references.len(),
            main = main_unique_index.as_deref().unwrap_or(""),
            "assembled table"
        );

        Ok(Table {
            name: name.to_string(),
            columns,
            primary_key,
            primary_key_sequence,
            unique_indexes,
            main_unique_index,
            references,
        })
    }
}

/// Provisional main-index election for one table.
///
/// Local decision only; the cross-table correction in
/// [`revoke_surrogate_keys`] may still clear the result.
pub fn elect_main_index(indexes: &BTreeMap<String, UniqueIndex>) -> Option<String> {
    if indexes.len() <= 1 {
        return indexes.keys().next().cloned();
    }
    find_index_covering(indexes, "label")
        .or_else(|| find_index_covering(indexes, "name"))
        .or_else(|| indexes.keys().next().cloned())
}

/// First index, in name order, covering `column`.
fn find_index_covering(indexes: &BTreeMap<String, UniqueIndex>, column: &str) -> Option<String> {
    indexes
        .values()
        .find(|idx| idx.covers(column))
        .map(|idx| idx.name.clone())
}

/// Phase 2: clear elections that turn out to describe foreign surrogate ids.
///
/// A provisional main index is a false natural key when one of its columns
/// is foreign-key-mapped to a column named `id` of a table, within the
/// assembled set, whose primary key is sequence-generated. Such an index
/// encodes a reference to an auto-generated id rather than independent
/// business data. Referenced tables outside the set, columns mapped to
/// anything other than `id`, and non-surrogate referenced keys leave the
/// election untouched.
///
/// Takes the complete set as an explicit argument and is idempotent.
pub fn revoke_surrogate_keys(tables: &mut [Table]) {
    let surrogate_tables: HashSet<String> = tables
        .iter()
        .filter(|t| t.has_surrogate_key())
        .map(|t| t.name.clone())
        .collect();

    for table in tables.iter_mut() {
        let Some(index) = table.elected_index() else {
            continue;
        };

        let revoke = index.columns.iter().any(|column| {
            table.references.iter().any(|reference| {
                reference.referenced_column(column) == Some("id")
                    && surrogate_tables.contains(&reference.table)
            })
        });

        if revoke {
            info!(table = table.name.as_str(), "revoked main unique index: covers a foreign surrogate id");
            table.main_unique_index = None;
        }
    }
}
