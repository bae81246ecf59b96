//! PostgreSQL catalog provider.
//!
//! Implements [`CatalogProvider`] with single-purpose reads against
//! `information_schema` and `pg_catalog`. One query per question, no
//! caching: the metadata set is small and read once at startup.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use super::error::{CatalogError, CatalogResult};
use super::naming::{ConventionalNaming, SequenceNaming};
use super::provider::CatalogProvider;
use crate::config::Settings;

/// Catalog provider backed by a PostgreSQL connection pool.
///
/// Holds the fixed target-table list (externally supplied, never
/// discovered), the schema to introspect, and the naming convention used
/// to bind sequences to primary keys.
pub struct PgCatalogProvider {
    pool: PgPool,
    schema: String,
    tables: Vec<String>,
    naming: Box<dyn SequenceNaming>,
}

impl PgCatalogProvider {
    /// Create a provider over an existing pool, inspecting the `public`
    /// schema with the conventional naming rule.
    pub fn new(pool: PgPool, tables: Vec<String>) -> Self {
        Self {
            pool,
            schema: "public".to_string(),
            tables,
            naming: Box::new(ConventionalNaming),
        }
    }

    /// Connect a new pool from settings and build a provider for the
    /// configured schema and target tables.
    pub async fn connect(settings: &Settings) -> CatalogResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.connection.max_connections)
            .connect(&settings.connection.url)
            .await
            .map_err(CatalogError::Connection)?;

        Ok(Self::new(pool, settings.tables.clone()).with_schema(&settings.connection.schema))
    }

    /// Set the schema to introspect.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Replace the sequence naming convention.
    pub fn with_naming(mut self, naming: Box<dyn SequenceNaming>) -> Self {
        self.naming = naming;
        self
    }

    /// Fetch a single text column from all rows of a query.
    async fn fetch_names(
        &self,
        sql: &str,
        binds: &[&str],
        context: &str,
    ) -> CatalogResult<Vec<String>> {
        let mut query = sqlx::query(sql);
        for bind in binds {
            query = query.bind(*bind);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CatalogError::query(context, e))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>(0)
                    .map_err(|e| CatalogError::query(context, e))
            })
            .collect()
    }

    /// The primary-key constraint name of `table`, only when the key's
    /// first column is `id` at ordinal position 1.
    async fn surrogate_pk_constraint(&self, table: &str) -> CatalogResult<Option<String>> {
        let context = format!("primary-key constraint of {table}");
        let row = sqlx::query(
            "SELECT tc.constraint_name::text \
             FROM information_schema.table_constraints AS tc \
             JOIN information_schema.key_column_usage AS kcu \
               ON tc.constraint_name = kcu.constraint_name \
              AND tc.constraint_schema = kcu.constraint_schema \
             WHERE tc.constraint_schema = $1 \
               AND tc.constraint_type = 'PRIMARY KEY' \
               AND kcu.ordinal_position = 1 \
               AND kcu.column_name = 'id' \
               AND tc.table_name = $2",
        )
        .bind(&self.schema)
        .bind(table)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CatalogError::query(context.as_str(), e))?;

        row.map(|r| {
            r.try_get::<String, _>(0)
                .map_err(|e| CatalogError::query(context.as_str(), e))
        })
        .transpose()
    }
}

#[async_trait]
impl CatalogProvider for PgCatalogProvider {
    async fn target_tables(&self) -> CatalogResult<Vec<String>> {
        Ok(self.tables.clone())
    }

    async fn columns(&self, table: &str) -> CatalogResult<Vec<String>> {
        self.fetch_names(
            "SELECT column_name::text \
             FROM information_schema.columns \
             WHERE table_schema = $1 AND table_name = $2 \
             ORDER BY ordinal_position",
            &[self.schema.as_str(), table],
            &format!("columns of {table}"),
        )
        .await
    }

    async fn primary_key_columns(&self, table: &str) -> CatalogResult<BTreeSet<String>> {
        let names = self
            .fetch_names(
                "SELECT a.attname::text \
                 FROM pg_index i \
                 JOIN pg_attribute a ON a.attrelid = i.indrelid \
                  AND a.attnum = ANY(i.indkey) \
                 WHERE i.indrelid = $1::regclass \
                   AND i.indisprimary",
                &[table],
                &format!("primary-key columns of {table}"),
            )
            .await?;
        Ok(names.into_iter().collect())
    }

    async fn primary_key_sequence(&self, table: &str) -> CatalogResult<Option<String>> {
        let Some(constraint) = self.surrogate_pk_constraint(table).await? else {
            return Ok(None);
        };

        // Candidates scanned in name order so the first match is stable.
        let sequences = self
            .fetch_names(
                "SELECT sequence_name::text \
                 FROM information_schema.sequences \
                 WHERE sequence_schema = $1 \
                 ORDER BY sequence_name",
                &[self.schema.as_str()],
                &format!("sequences for {table}"),
            )
            .await?;

        Ok(sequences
            .into_iter()
            .find(|seq| self.naming.binds(&constraint, seq)))
    }

    async fn unique_indexes(
        &self,
        table: &str,
    ) -> CatalogResult<BTreeMap<String, BTreeSet<String>>> {
        let names = self
            .fetch_names(
                "SELECT DISTINCT i.indexrelid::regclass::text \
                 FROM pg_index i \
                 WHERE i.indrelid = $1::regclass \
                   AND i.indisunique AND NOT i.indisprimary",
                &[table],
                &format!("unique indexes of {table}"),
            )
            .await?;

        let mut indexes = BTreeMap::new();
        for name in names {
            let columns = self
                .fetch_names(
                    "SELECT DISTINCT a.attname::text \
                     FROM pg_index i \
                     JOIN pg_attribute a ON a.attrelid = i.indrelid \
                      AND a.attnum = ANY(i.indkey) \
                     WHERE i.indexrelid = $1::regclass",
                    &[name.as_str()],
                    &format!("columns of index {name}"),
                )
                .await?;
            indexes.insert(name, columns.into_iter().collect());
        }
        Ok(indexes)
    }

    async fn foreign_key_names(&self, table: &str) -> CatalogResult<Vec<String>> {
        self.fetch_names(
            "SELECT DISTINCT tc.constraint_name::text \
             FROM information_schema.table_constraints AS tc \
             WHERE tc.constraint_type = 'FOREIGN KEY' \
               AND tc.table_schema = $1 \
               AND tc.table_name = $2 \
             ORDER BY 1",
            &[self.schema.as_str(), table],
            &format!("foreign keys of {table}"),
        )
        .await
    }

    async fn foreign_key_columns(
        &self,
        table: &str,
        constraint: &str,
    ) -> CatalogResult<BTreeMap<String, String>> {
        let context = format!("columns of constraint {constraint} on {table}");
        let rows = sqlx::query(
            "SELECT DISTINCT kcu.column_name::text, ccu.column_name::text AS foreign_column_name \
             FROM information_schema.table_constraints AS tc \
             JOIN information_schema.key_column_usage AS kcu \
               ON tc.constraint_name = kcu.constraint_name \
              AND tc.table_schema = kcu.table_schema \
              AND tc.table_name = kcu.table_name \
             JOIN information_schema.constraint_column_usage AS ccu \
               ON ccu.constraint_name = tc.constraint_name \
              AND tc.table_schema = ccu.table_schema \
             WHERE tc.constraint_type = 'FOREIGN KEY' \
               AND tc.table_schema = $1 \
               AND tc.table_name = $2 \
               AND tc.constraint_name = $3",
        )
        .bind(&self.schema)
        .bind(table)
        .bind(constraint)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CatalogError::query(context.as_str(), e))?;

        let mut mapping = BTreeMap::new();
        for row in rows {
            let local: String = row
                .try_get(0)
                .map_err(|e| CatalogError::query(context.as_str(), e))?;
            let referenced: String = row
                .try_get(1)
                .map_err(|e| CatalogError::query(context.as_str(), e))?;
            mapping.insert(local, referenced);
        }
        Ok(mapping)
    }

    async fn foreign_key_referenced_table(
        &self,
        table: &str,
        constraint: &str,
    ) -> CatalogResult<String> {
        let context = format!("referenced table of constraint {constraint} on {table}");
        let row = sqlx::query(
            "SELECT DISTINCT ccu.table_name::text \
             FROM information_schema.constraint_column_usage AS ccu \
             WHERE ccu.constraint_schema = $1 \
               AND ccu.constraint_name = $2",
        )
        .bind(&self.schema)
        .bind(constraint)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CatalogError::query(context.as_str(), e))?;

        row.map(|r| {
            r.try_get::<String, _>(0)
                .map_err(|e| CatalogError::query(context.as_str(), e))
        })
        .transpose()
        .map(Option::unwrap_or_default)
    }
}
