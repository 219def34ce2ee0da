//! RPA Process Entity
//!
//! An automation process tracked through its lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Resource;
use crate::cache::cache_keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessStatus {
    #[default]
    Active,
    InProgress,
    Completed,
    OnHold,
}

impl ProcessStatus {
    /// Order used when grouping the grid by status
    pub const GROUP_ORDER: [ProcessStatus; 4] = [
        ProcessStatus::Active,
        ProcessStatus::InProgress,
        ProcessStatus::OnHold,
        ProcessStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Active => "active",
            ProcessStatus::InProgress => "in-progress",
            ProcessStatus::Completed => "completed",
            ProcessStatus::OnHold => "on-hold",
        }
    }

    /// Group heading ("IN PROGRESS")
    pub fn heading(&self) -> String {
        self.as_str().replace('-', " ").to_uppercase()
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ProcessStatus::Active),
            "in-progress" => Some(ProcessStatus::InProgress),
            "completed" => Some(ProcessStatus::Completed),
            "on-hold" => Some(ProcessStatus::OnHold),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RpaProcess {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: ProcessStatus,
    pub owner: Option<String>,
    pub department: Option<String>,
    pub entity_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessDraft {
    pub name: String,
    pub description: String,
    pub status: ProcessStatus,
    pub owner: Option<String>,
    pub department: Option<String>,
    pub entity_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

/// Partial update; `Some(None)` clears an optional field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProcessStatus>,
    pub owner: Option<Option<String>>,
    pub department: Option<Option<String>>,
    pub entity_name: Option<Option<String>>,
    pub start_date: Option<Option<NaiveDate>>,
    pub due_date: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProcessRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: ProcessStatus,
    pub owner: Option<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub entity_name: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessInsert {
    pub name: String,
    pub description: String,
    pub status: ProcessStatus,
    pub owner: Option<String>,
    pub department: Option<String>,
    pub entity_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProcessStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    pub last_modified: DateTime<Utc>,
}

/// Blank optional text fields are stored as null
fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()).map(str::to_string)
}

impl From<ProcessRow> for RpaProcess {
    fn from(row: ProcessRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            status: row.status,
            owner: row.owner,
            department: row.department,
            entity_name: row.entity_name,
            start_date: row.start_date,
            due_date: row.due_date,
            display_order: row.display_order,
            created_at: row.created_at,
            last_modified: row.last_modified,
        }
    }
}

impl Resource for RpaProcess {
    const TABLE: &'static str = "rpa_processes";
    const LABEL: &'static str = "process";

    type Row = ProcessRow;
    type Insert = ProcessInsert;
    type Update = ProcessUpdate;
    type Draft = ProcessDraft;
    type Patch = ProcessPatch;
    type Query = crate::query::ProcessQuery;

    fn from_row(row: ProcessRow) -> Self {
        row.into()
    }

    fn insert_row(draft: &ProcessDraft, display_order: i32) -> ProcessInsert {
        ProcessInsert {
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            status: draft.status,
            owner: non_blank(&draft.owner),
            department: non_blank(&draft.department),
            entity_name: non_blank(&draft.entity_name),
            start_date: draft.start_date,
            due_date: draft.due_date,
            display_order,
        }
    }

    fn update_row(patch: &ProcessPatch, now: DateTime<Utc>) -> ProcessUpdate {
        ProcessUpdate {
            name: patch.name.as_ref().map(|s| s.trim().to_string()),
            description: patch.description.as_ref().map(|s| s.trim().to_string()),
            status: patch.status,
            owner: patch.owner.as_ref().map(non_blank),
            department: patch.department.as_ref().map(non_blank),
            entity_name: patch.entity_name.as_ref().map(non_blank),
            start_date: patch.start_date,
            due_date: patch.due_date,
            last_modified: now,
        }
    }

    fn provisional(id: String, draft: &ProcessDraft, display_order: i32, now: DateTime<Utc>) -> Self {
        let insert = Self::insert_row(draft, display_order);
        Self {
            id,
            name: insert.name,
            description: insert.description,
            status: insert.status,
            owner: insert.owner,
            department: insert.department,
            entity_name: insert.entity_name,
            start_date: insert.start_date,
            due_date: insert.due_date,
            display_order,
            created_at: now,
            last_modified: now,
        }
    }

    fn apply_patch(&mut self, patch: &ProcessPatch, now: DateTime<Utc>) {
        let update = Self::update_row(patch, now);
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(owner) = update.owner {
            self.owner = owner;
        }
        if let Some(department) = update.department {
            self.department = department;
        }
        if let Some(entity_name) = update.entity_name {
            self.entity_name = entity_name;
        }
        if let Some(start_date) = update.start_date {
            self.start_date = start_date;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        self.last_modified = now;
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
        cache_keys::rpa_processes(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_optionals_become_null() {
        let draft = ProcessDraft {
            name: " Invoice Processing ".into(),
            description: "Automates vendor invoices".into(),
            owner: Some("   ".into()),
            department: Some("Finance".into()),
            ..ProcessDraft::default()
        };
        let insert = RpaProcess::insert_row(&draft, 0);
        assert_eq!(insert.name, "Invoice Processing");
        assert_eq!(insert.owner, None);
        assert_eq!(insert.department.as_deref(), Some("Finance"));
    }

    #[test]
    fn test_status_wire_and_heading() {
        assert_eq!(serde_json::to_value(ProcessStatus::InProgress).unwrap(), "in-progress");
        assert_eq!(ProcessStatus::OnHold.heading(), "ON HOLD");
        assert_eq!(ProcessStatus::parse("on-hold"), Some(ProcessStatus::OnHold));
    }
}
