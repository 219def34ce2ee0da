//! Gateway Layer - Core Traits
//!
//! Defines the abstract interface to a remote table.
//! Rows travel as JSON objects with snake_case keys; the typed conversion
//! happens in the domain layer.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("{0}")]
    Rejected(String),
    #[error("no row matched {id} in {table}")]
    NoRows { table: String, id: String },
    #[error("decode error: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Text used for classification and display
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Worth retrying: the request may not have reached the backend, or the
    /// backend was temporarily unable to serve it
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Transport(_) => true,
            GatewayError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// One row's new position in a bulk reorder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderUpdate {
    pub id: String,
    pub display_order: i32,
}

/// Remote table operations, always scoped to the owning user.
///
/// `?Send`: calls run on the single-threaded UI event loop.
#[async_trait(?Send)]
pub trait TableGateway {
    /// All of the owner's rows ordered by `display_order` ascending
    async fn select(&self, table: &str, owner: &str) -> GatewayResult<Vec<Value>>;

    /// Insert one row and return it as stored (with its server id)
    async fn insert(&self, table: &str, owner: &str, row: Value) -> GatewayResult<Value>;

    /// Apply a partial patch to one row and return the updated row
    async fn update(&self, table: &str, owner: &str, id: &str, patch: Value) -> GatewayResult<Value>;

    /// Delete one row by id
    async fn delete(&self, table: &str, owner: &str, id: &str) -> GatewayResult<()>;

    /// Shift every row of the owner down by one position
    async fn increment_display_order(&self, table: &str, owner: &str) -> GatewayResult<()>;

    /// Write new positions for a set of rows
    async fn set_display_orders(&self, table: &str, owner: &str, updates: &[OrderUpdate]) -> GatewayResult<()>;
}
