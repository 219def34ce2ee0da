//! Domain Layer - Resource Trait
//!
//! The contract shared by tasks, notes and RPA processes: a table, a typed
//! wire row, and the conversions in both directions.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::query::ViewQuery;

const TEMP_PREFIX: &str = "tmp-";

/// Local id for an item the server has not confirmed yet
pub fn temporary_id() -> String {
    format!("{}{}", TEMP_PREFIX, uuid::Uuid::new_v4())
}

pub fn is_temporary_id(id: &str) -> bool {
    id.starts_with(TEMP_PREFIX)
}

pub trait Resource: Clone + PartialEq + std::fmt::Debug + 'static {
    /// Remote table name
    const TABLE: &'static str;
    /// Singular name used in messages ("task")
    const LABEL: &'static str;

    /// Row as read from the table
    type Row: DeserializeOwned;
    /// Row written on create
    type Insert: Serialize;
    /// Partial row written on update
    type Update: Serialize;
    /// Fields supplied by the caller on create
    type Draft: Clone;
    /// Fields supplied by the caller on update
    type Patch: Clone;
    /// Filter/search state for the page listing this resource
    type Query: ViewQuery<Self>;

    fn from_row(row: Self::Row) -> Self;
    fn insert_row(draft: &Self::Draft, display_order: i32) -> Self::Insert;
    fn update_row(patch: &Self::Patch, now: DateTime<Utc>) -> Self::Update;

    /// Local stand-in shown until the server row arrives
    fn provisional(id: String, draft: &Self::Draft, display_order: i32, now: DateTime<Utc>) -> Self;
    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>);

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn display_order(&self) -> i32;
    fn set_display_order(&mut self, order: i32);
    fn cache_key(owner: &str) -> String;
}
