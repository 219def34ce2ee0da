//! Store Errors
//!
//! Every failure a store can hit ends up as one of these variants and is
//! rendered into the store's user-facing error string.

use thiserror::Error;

use crate::gateway::GatewayError;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("User not authenticated")]
    NotAuthenticated,
    #[error("Database table not found. Please run the database setup script. (missing: {table})")]
    SchemaMissing { table: String },
    #[error("Failed to {action}: {message}")]
    Remote { action: String, message: String },
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },
    #[error("{resource} has not been saved yet: {id}")]
    NotSaved { resource: &'static str, id: String },
    #[error("Reorder must contain every current item exactly once")]
    InvalidReorder,
    #[error("Unexpected row shape from {table}: {message}")]
    Decode { table: &'static str, message: String },
}

impl StoreError {
    /// Convert a gateway failure for `action` (e.g. "create task") on `table`
    pub fn from_gateway(err: &GatewayError, action: &str, table: &str) -> Self {
        let message = err.message();
        if is_schema_error(&message) {
            return StoreError::SchemaMissing { table: table.to_string() };
        }
        StoreError::Remote {
            action: action.to_string(),
            message,
        }
    }
}

/// Does the backend error text mean the table or a column is not set up?
pub fn is_schema_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    (lower.contains("relation \"") && lower.contains("does not exist"))
        || (lower.contains("column") && lower.contains("does not exist"))
        || lower.contains("no such table")
        || lower.contains("no such column")
        || lower.contains("could not find the table")
        || lower.contains("pgrst205")
}
