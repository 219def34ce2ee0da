//! Task Entity

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Resource;
use crate::cache::cache_keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Sort tier: high first
    pub fn tier(&self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "On Hold")]
    OnHold,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "Not Started",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::OnHold => "On Hold",
        }
    }
}

/// A task as the app sees it
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    pub completed: bool,
    pub status: TaskStatus,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    /// Manual sort position (0 = top)
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Due before `today` and still open
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }

    /// Due on `today` and still open
    pub fn is_due_today(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date == Some(today)
    }

    /// Patch that flips completion; status follows
    pub fn toggle_patch(&self) -> TaskPatch {
        let completed = !self.completed;
        TaskPatch {
            completed: Some(completed),
            status: Some(if completed { TaskStatus::Completed } else { TaskStatus::NotStarted }),
            ..TaskPatch::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: title.into(),
            priority,
            ..Self::default()
        }
    }
}

/// Partial update; `Some(None)` clears a date
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    pub status: Option<TaskStatus>,
    pub start_date: Option<Option<NaiveDate>>,
    pub due_date: Option<Option<NaiveDate>>,
}

// ========================
// Wire rows
// ========================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskRow {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    pub completed: bool,
    pub status: TaskStatus,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskInsert {
    pub title: String,
    pub priority: Priority,
    pub completed: bool,
    pub status: TaskStatus,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            priority: row.priority,
            completed: row.completed,
            status: row.status,
            start_date: row.start_date,
            due_date: row.due_date,
            display_order: row.display_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Resource for Task {
    const TABLE: &'static str = "tasks";
    const LABEL: &'static str = "task";

    type Row = TaskRow;
    type Insert = TaskInsert;
    type Update = TaskUpdate;
    type Draft = TaskDraft;
    type Patch = TaskPatch;
    type Query = crate::query::TaskQuery;

    fn from_row(row: TaskRow) -> Self {
        row.into()
    }

    fn insert_row(draft: &TaskDraft, display_order: i32) -> TaskInsert {
        TaskInsert {
            title: draft.title.trim().to_string(),
            priority: draft.priority,
            completed: draft.status == TaskStatus::Completed,
            status: draft.status,
            start_date: draft.start_date,
            due_date: draft.due_date,
            display_order,
        }
    }

    fn update_row(patch: &TaskPatch, now: DateTime<Utc>) -> TaskUpdate {
        TaskUpdate {
            title: patch.title.as_ref().map(|t| t.trim().to_string()),
            priority: patch.priority,
            completed: patch.completed,
            status: patch.status,
            start_date: patch.start_date,
            due_date: patch.due_date,
            updated_at: now,
        }
    }

    fn provisional(id: String, draft: &TaskDraft, display_order: i32, now: DateTime<Utc>) -> Self {
        let insert = Self::insert_row(draft, display_order);
        Self {
            id,
            title: insert.title,
            priority: insert.priority,
            completed: insert.completed,
            status: insert.status,
            start_date: insert.start_date,
            due_date: insert.due_date,
            display_order,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &TaskPatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        self.updated_at = now;
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
        cache_keys::tasks(owner)
    }
}
