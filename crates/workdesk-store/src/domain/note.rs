//! Note Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Resource;
use crate::cache::cache_keys;

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub last_edited: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NoteRow {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub last_edited: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteInsert {
    pub title: String,
    pub content: String,
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub last_edited: DateTime<Utc>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            display_order: row.display_order,
            created_at: row.created_at,
            last_edited: row.last_edited,
        }
    }
}

impl Resource for Note {
    const TABLE: &'static str = "notes";
    const LABEL: &'static str = "note";

    type Row = NoteRow;
    type Insert = NoteInsert;
    type Update = NoteUpdate;
    type Draft = NoteDraft;
    type Patch = NotePatch;
    type Query = crate::query::NoteQuery;

    fn from_row(row: NoteRow) -> Self {
        row.into()
    }

    fn insert_row(draft: &NoteDraft, display_order: i32) -> NoteInsert {
        NoteInsert {
            title: draft.title.trim().to_string(),
            content: draft.content.clone(),
            display_order,
        }
    }

    fn update_row(patch: &NotePatch, now: DateTime<Utc>) -> NoteUpdate {
        NoteUpdate {
            title: patch.title.as_ref().map(|t| t.trim().to_string()),
            content: patch.content.clone(),
            last_edited: now,
        }
    }

    fn provisional(id: String, draft: &NoteDraft, display_order: i32, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            content: draft.content.clone(),
            display_order,
            created_at: now,
            last_edited: now,
        }
    }

    fn apply_patch(&mut self, patch: &NotePatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        self.last_edited = now;
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn display_order(&self) -> i32 {
        self.display_order
    }

    fn set_display_order(&mut self, order: i32) {
        self.display_order = order;
    }

    fn cache_key(owner: &str) -> String {
        cache_keys::notes(owner)
    }
}
