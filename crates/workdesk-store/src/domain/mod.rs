//! Domain Layer
//!
//! Resource types as the app sees them, their wire rows, and the
//! `Resource` trait the generic store is written against.

mod entity;
mod note;
mod process;
mod task;

pub use entity::{is_temporary_id, temporary_id, Resource};
pub use note::{Note, NoteDraft, NoteInsert, NotePatch, NoteRow, NoteUpdate};
pub use process::{ProcessDraft, ProcessInsert, ProcessPatch, ProcessRow, ProcessStatus, ProcessUpdate, RpaProcess};
pub use task::{Priority, Task, TaskDraft, TaskInsert, TaskPatch, TaskRow, TaskStatus, TaskUpdate};
