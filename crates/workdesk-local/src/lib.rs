//! Workdesk Local Backend
//!
//! SQLite implementation of the table gateway, speaking the same snake_case
//! row shapes as the hosted backend.
//! - db: connection setup and migrations
//! - schema: per-table column layout and JSON ↔ SQL conversion
//! - gateway: `TableGateway` over the local database
//! - seed: demo rows

mod db;
mod gateway;
mod schema;
mod seed;

#[cfg(test)]
mod tests;

pub use db::{LocalDb, LocalDbError};
pub use gateway::LocalGateway;
pub use schema::{ColumnKind, TableSchema, TABLES};
pub use seed::{seed_demo, SeedReport};
