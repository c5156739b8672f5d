//! Database-specific error types and conversions.

use bloodlink_core::error::BloodlinkError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Corrupt row: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for BloodlinkError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => BloodlinkError::NotFound { entity, id },
            other => BloodlinkError::Database(other.to_string()),
        }
    }
}
