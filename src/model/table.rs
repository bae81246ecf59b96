//! Table, unique index and reference entities.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A unique index on a table, excluding the primary-key index.
///
/// Only *additional* unique indexes are modeled; the primary key itself is
/// carried on [`Table::primary_key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueIndex {
    /// Index name, unique within the owning table.
    pub name: String,
    /// Columns covered by the index. Always a subset of the table's columns.
    pub columns: BTreeSet<String>,
}

impl UniqueIndex {
    /// Create a unique index from a name and its column set.
    pub fn new(name: impl Into<String>, columns: impl IntoIterator<Item = String>) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().collect(),
        }
    }

    /// Whether the index covers the given column.
    pub fn covers(&self, column: &str) -> bool {
        self.columns.contains(column)
    }
}

/// One outgoing foreign-key constraint.
///
/// The referenced table may lie outside the modeled set; lookups by name
/// then simply find no match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Name of the referenced table.
    pub table: String,
    /// Local column name -> referenced column name, one entry per column
    /// participating in the constraint.
    pub column_mapping: BTreeMap<String, String>,
}

impl Reference {
    /// Create a reference to `table` with the given column mapping.
    pub fn new(
        table: impl Into<String>,
        column_mapping: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            table: table.into(),
            column_mapping: column_mapping.into_iter().collect(),
        }
    }

    /// The referenced column that `local_column` maps to, if it participates
    /// in this constraint.
    pub fn referenced_column(&self, local_column: &str) -> Option<&str> {
        self.column_mapping.get(local_column).map(String::as_str)
    }
}

/// The assembled structural model of one table.
///
/// Constructed once per assembly run from catalog answers; the correction
/// pass may clear [`main_unique_index`](Self::main_unique_index) exactly
/// once afterward, and the entity is read-only from then on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name, unique across the modeled set.
    pub name: String,
    /// Column names ordered by ordinal position.
    pub columns: Vec<String>,
    /// Columns forming the primary key (empty if the table has none).
    pub primary_key: BTreeSet<String>,
    /// The sequence backing the primary key, when the primary key is the
    /// single column `id` and a sequence matches it by naming convention.
    /// `Some` marks the primary key as a generated surrogate.
    pub primary_key_sequence: Option<String>,
    /// Unique indexes by name, excluding the primary-key index. The sorted
    /// map gives election its deterministic iteration order.
    pub unique_indexes: BTreeMap<String, UniqueIndex>,
    /// The elected natural key, or `None` when no unique index can be
    /// trusted to carry business meaning.
    pub main_unique_index: Option<String>,
    /// Outgoing foreign keys, in constraint-name order.
    pub references: Vec<Reference>,
}

impl Table {
    /// The elected main unique index, resolved against
    /// [`unique_indexes`](Self::unique_indexes).
    pub fn elected_index(&self) -> Option<&UniqueIndex> {
        self.main_unique_index
            .as_deref()
            .and_then(|name| self.unique_indexes.get(name))
    }

    /// First unique index (by name) covering `column`, if any.
    pub fn index_containing(&self, column: &str) -> Option<&UniqueIndex> {
        self.unique_indexes.values().find(|idx| idx.covers(column))
    }

    /// Whether the primary key is a generated surrogate (sequence-backed).
    pub fn has_surrogate_key(&self) -> bool {
        self.primary_key_sequence.is_some()
    }
}
