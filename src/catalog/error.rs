//! Catalog-access error types.

use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while reading catalog metadata.
///
/// All of these are fatal to an assembly run: catalog introspection is a
/// one-shot, startup-time activity, so there is no retry policy and no
/// partial result.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A catalog query failed. `context` identifies the query and the
    /// table or constraint it was asked about.
    #[error("catalog query failed ({context}): {source}")]
    Query {
        /// Which query failed, and for which object.
        context: String,
        #[source]
        source: sqlx::Error,
    },

    /// Connecting to the database failed.
    #[error("database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    /// A provider-specific failure outside the SQL layer.
    #[error("catalog provider error: {0}")]
    Provider(String),
}

impl CatalogError {
    /// Wrap a sqlx error with the query context it occurred in.
    pub fn query(context: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Query {
            context: context.into(),
            source,
        }
    }
}
