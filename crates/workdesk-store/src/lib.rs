//! Workdesk Store
//!
//! Client-side state layer for the workdesk frontend:
//! - domain: Task, Note and RPA process types with their wire rows
//! - cache: process-wide TTL cache keyed by user
//! - gateway: remote table access (REST), realtime change frames and the
//!   acting-user provider
//! - store: optimistic resource stores with rollback
//! - query: filtering, sorting, grouping and stats
//! - reorder: drag-end resolution and array moves
//! - prefs: layout preferences persisted in key/value storage
//! - validation: form checks shared by the create/edit dialogs

pub mod cache;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod prefs;
pub mod query;
pub mod reorder;
pub mod retry;
pub mod store;
pub mod validation;

pub use cache::{cache_keys, TtlCache};
pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, StoreConfig};
pub use domain::{
    Note, NoteDraft, NotePatch, Priority, ProcessDraft, ProcessPatch, ProcessStatus, Resource,
    RpaProcess, Task, TaskDraft, TaskPatch, TaskStatus,
};
pub use error::{StoreError, StoreResult};
pub use gateway::{
    AuthProvider, GatewayError, GatewayResult, RealtimeChannel, RemoteChange, RestGateway, Session, StaticAuth, TableGateway,
};
pub use prefs::{LayoutPage, LayoutPreferences, MemoryStorage, PreferenceError, PreferenceStorage, ViewMode};
pub use query::{
    group_by_status, NoteQuery, ProcessFilter, ProcessQuery, ProcessStats, TaskFilter, TaskQuery, TaskStats, ViewQuery,
};
pub use reorder::{array_move, DragEnd, ReorderController};
pub use retry::{Mutation, RetryPolicy, RetryScope};
pub use validation::FieldErrors;
pub use store::{NoteStore, ProcessStore, ResourceStore, StoreDeps, TaskStore};
