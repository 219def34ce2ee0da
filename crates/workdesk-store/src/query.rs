//! Filtering, Sorting and Stats
//!
//! Each resource has a query (filter + search) that turns the store's list
//! into the list a page renders.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Note, Priority, ProcessStatus, RpaProcess, Task};
use crate::prefs::ViewMode;

/// A resource's filter/search state
pub trait ViewQuery<R>: Clone + Default + PartialEq {
    /// Items to render, in render order
    fn apply(&self, items: &[R], today: NaiveDate) -> Vec<R>;

    /// Anything other than "show everything in manual order"
    fn is_active(&self) -> bool;

    fn search(&self) -> &str;
    fn set_search(&mut self, search: String);
}

fn matches_search(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

// ========================
// Tasks
// ========================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
    Overdue,
    DueToday,
    High,
    Medium,
    Low,
}

impl TaskFilter {
    pub const ALL: [TaskFilter; 8] = [
        TaskFilter::All,
        TaskFilter::Pending,
        TaskFilter::Completed,
        TaskFilter::Overdue,
        TaskFilter::DueToday,
        TaskFilter::High,
        TaskFilter::Medium,
        TaskFilter::Low,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskFilter::All => "All",
            TaskFilter::Pending => "Pending",
            TaskFilter::Completed => "Completed",
            TaskFilter::Overdue => "Overdue",
            TaskFilter::DueToday => "Due Today",
            TaskFilter::High => "High",
            TaskFilter::Medium => "Medium",
            TaskFilter::Low => "Low",
        }
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Pending => !task.completed,
            TaskFilter::Completed => task.completed,
            TaskFilter::Overdue => task.is_overdue(today),
            TaskFilter::DueToday => task.is_due_today(today),
            TaskFilter::High => task.priority == Priority::High,
            TaskFilter::Medium => task.priority == Priority::Medium,
            TaskFilter::Low => task.priority == Priority::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskQuery {
    pub filter: TaskFilter,
    pub search: String,
}

impl TaskQuery {
    pub fn new(filter: TaskFilter, search: impl Into<String>) -> Self {
        Self { filter, search: search.into() }
    }
}

/// Manual order, completed tasks last
fn manual_order(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then(a.display_order.cmp(&b.display_order))
}

/// Completed last; open tasks by priority tier then due date (undated last)
fn smart_order(a: &Task, b: &Task) -> Ordering {
    if a.completed != b.completed {
        return a.completed.cmp(&b.completed);
    }
    if a.completed {
        return Ordering::Equal;
    }
    a.priority.tier().cmp(&b.priority.tier()).then_with(|| match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    })
}

impl ViewQuery<Task> for TaskQuery {
    fn apply(&self, items: &[Task], today: NaiveDate) -> Vec<Task> {
        let needle = self.search.trim().to_lowercase();
        let mut visible: Vec<Task> = items
            .iter()
            .filter(|t| self.filter.matches(t, today))
            .filter(|t| needle.is_empty() || matches_search(&t.title, &needle))
            .cloned()
            .collect();

        if self.is_active() {
            visible.sort_by(smart_order);
        } else {
            visible.sort_by(manual_order);
        }
        visible
    }

    fn is_active(&self) -> bool {
        self.filter != TaskFilter::All || !self.search.trim().is_empty()
    }

    fn search(&self) -> &str {
        &self.search
    }

    fn set_search(&mut self, search: String) {
        self.search = search;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Open high-priority tasks
    pub high_priority: usize,
    pub overdue: usize,
}

impl TaskStats {
    pub fn collect(tasks: &[Task], today: NaiveDate) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();
        Self {
            total: tasks.len(),
            completed,
            pending: tasks.len() - completed,
            high_priority: tasks.iter().filter(|t| !t.completed && t.priority == Priority::High).count(),
            overdue: tasks.iter().filter(|t| t.is_overdue(today)).count(),
        }
    }
}

// ========================
// Notes
// ========================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NoteQuery {
    pub search: String,
}

impl ViewQuery<Note> for NoteQuery {
    fn apply(&self, items: &[Note], _today: NaiveDate) -> Vec<Note> {
        let needle = self.search.trim().to_lowercase();
        let mut visible: Vec<Note> = items
            .iter()
            .filter(|n| needle.is_empty() || matches_search(&n.title, &needle) || matches_search(&n.content, &needle))
            .cloned()
            .collect();
        if needle.is_empty() {
            visible.sort_by_key(|n| n.display_order);
        } else {
            // search results: most recently edited first
            visible.sort_by(|a, b| b.last_edited.cmp(&a.last_edited));
        }
        visible
    }

    fn is_active(&self) -> bool {
        !self.search.trim().is_empty()
    }

    fn search(&self) -> &str {
        &self.search
    }

    fn set_search(&mut self, search: String) {
        self.search = search;
    }
}

// ========================
// RPA processes
// ========================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessFilter {
    #[default]
    All,
    Active,
    InProgress,
    Completed,
    OnHold,
}

impl ProcessFilter {
    pub const ALL: [ProcessFilter; 5] = [
        ProcessFilter::All,
        ProcessFilter::Active,
        ProcessFilter::InProgress,
        ProcessFilter::Completed,
        ProcessFilter::OnHold,
    ];

    pub fn status(&self) -> Option<ProcessStatus> {
        match self {
            ProcessFilter::All => None,
            ProcessFilter::Active => Some(ProcessStatus::Active),
            ProcessFilter::InProgress => Some(ProcessStatus::InProgress),
            ProcessFilter::Completed => Some(ProcessStatus::Completed),
            ProcessFilter::OnHold => Some(ProcessStatus::OnHold),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProcessFilter::All => "All",
            ProcessFilter::Active => "Active",
            ProcessFilter::InProgress => "In Progress",
            ProcessFilter::Completed => "Completed",
            ProcessFilter::OnHold => "On Hold",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessQuery {
    pub filter: ProcessFilter,
    pub search: String,
}

impl ProcessQuery {
    /// Group the grid by status only when nothing narrows the list
    pub fn groups_by_status(&self, view_mode: ViewMode) -> bool {
        !self.is_active() && view_mode == ViewMode::Grid
    }
}

fn process_matches(process: &RpaProcess, needle: &str) -> bool {
    matches_search(&process.name, needle)
        || matches_search(&process.description, needle)
        || process.owner.as_deref().is_some_and(|o| matches_search(o, needle))
        || process.department.as_deref().is_some_and(|d| matches_search(d, needle))
}

impl ViewQuery<RpaProcess> for ProcessQuery {
    fn apply(&self, items: &[RpaProcess], _today: NaiveDate) -> Vec<RpaProcess> {
        let needle = self.search.trim().to_lowercase();
        let mut visible: Vec<RpaProcess> = items
            .iter()
            .filter(|p| self.filter.status().map_or(true, |s| p.status == s))
            .filter(|p| needle.is_empty() || process_matches(p, &needle))
            .cloned()
            .collect();
        visible.sort_by_key(|p| p.display_order);
        visible
    }

    fn is_active(&self) -> bool {
        self.filter != ProcessFilter::All || !self.search.trim().is_empty()
    }

    fn search(&self) -> &str {
        &self.search
    }

    fn set_search(&mut self, search: String) {
        self.search = search;
    }
}

/// Split processes into status groups (active, in-progress, on-hold,
/// completed), dropping empty groups and keeping order within each
pub fn group_by_status(processes: &[RpaProcess]) -> Vec<(ProcessStatus, Vec<RpaProcess>)> {
    ProcessStatus::GROUP_ORDER
        .iter()
        .filter_map(|status| {
            let group: Vec<RpaProcess> = processes.iter().filter(|p| p.status == *status).cloned().collect();
            (!group.is_empty()).then_some((*status, group))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessStats {
    pub total: usize,
    pub active: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub on_hold: usize,
}

impl ProcessStats {
    pub fn collect(processes: &[RpaProcess]) -> Self {
        let count = |status: ProcessStatus| processes.iter().filter(|p| p.status == status).count();
        Self {
            total: processes.len(),
            active: count(ProcessStatus::Active),
            in_progress: count(ProcessStatus::InProgress),
            completed: count(ProcessStatus::Completed),
            on_hold: count(ProcessStatus::OnHold),
        }
    }
}
