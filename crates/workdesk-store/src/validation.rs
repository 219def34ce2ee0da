//! Form Validation
//!
//! Checks run by the create/edit forms before a draft reaches a store.
//! Each check returns field name → message; an empty map means valid.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{NoteDraft, ProcessDraft, TaskDraft};

pub type FieldErrors = BTreeMap<&'static str, String>;

/// Required text with trimmed length bounds
fn check_length(
    errors: &mut FieldErrors,
    field: &'static str,
    label: &str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.insert(field, format!("{} is required", label));
    } else if len < min {
        errors.insert(field, format!("{} must be at least {} characters", label, min));
    } else if len > max {
        errors.insert(field, format!("{} must be less than {} characters", label, max));
    }
}

fn check_optional_max(errors: &mut FieldErrors, field: &'static str, label: &str, value: Option<&str>, max: usize) {
    if value.is_some_and(|v| v.chars().count() > max) {
        errors.insert(field, format!("{} must be less than {} characters", label, max));
    }
}

fn check_date_order(errors: &mut FieldErrors, start: Option<NaiveDate>, due: Option<NaiveDate>) {
    if let (Some(start), Some(due)) = (start, due) {
        if start > due {
            errors.insert("due_date", "Due date must be after start date".to_string());
        }
    }
}

pub fn validate_task(draft: &TaskDraft, today: NaiveDate) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_length(&mut errors, "title", "Task title", &draft.title, 3, 200);
    check_date_order(&mut errors, draft.start_date, draft.due_date);
    if draft.due_date.is_some_and(|due| due < today) {
        errors.insert("due_date", "Due date cannot be in the past".to_string());
    }
    errors
}

pub fn validate_process(draft: &ProcessDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_length(&mut errors, "name", "Process name", &draft.name, 3, 100);
    check_length(&mut errors, "description", "Description", &draft.description, 10, 1000);
    check_optional_max(&mut errors, "owner", "Owner name", draft.owner.as_deref(), 100);
    check_optional_max(&mut errors, "department", "Department", draft.department.as_deref(), 100);
    check_optional_max(&mut errors, "entity_name", "Entity name", draft.entity_name.as_deref(), 100);
    check_date_order(&mut errors, draft.start_date, draft.due_date);
    errors
}

pub fn validate_note(draft: &NoteDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_length(&mut errors, "title", "Note title", &draft.title, 2, 200);
    check_length(&mut errors, "content", "Note content", &draft.content, 5, 10_000);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 9).unwrap()
    }

    #[test]
    fn test_task_title_bounds() {
        assert_eq!(
            validate_task(&TaskDraft::new("   ", Priority::Low), today())["title"],
            "Task title is required"
        );
        assert_eq!(
            validate_task(&TaskDraft::new("ab", Priority::Low), today())["title"],
            "Task title must be at least 3 characters"
        );
        assert!(validate_task(&TaskDraft::new("x".repeat(201), Priority::Low), today()).contains_key("title"));
        assert!(validate_task(&TaskDraft::new("Review invoices", Priority::Low), today()).is_empty());
    }

    #[test]
    fn test_task_dates() {
        let mut draft = TaskDraft::new("Review invoices", Priority::High);
        draft.start_date = NaiveDate::from_ymd_opt(2024, 8, 20);
        draft.due_date = NaiveDate::from_ymd_opt(2024, 8, 15);
        assert_eq!(validate_task(&draft, today())["due_date"], "Due date must be after start date");

        draft.start_date = None;
        draft.due_date = today().pred_opt();
        assert_eq!(validate_task(&draft, today())["due_date"], "Due date cannot be in the past");

        draft.due_date = Some(today());
        assert!(validate_task(&draft, today()).is_empty());
    }

    #[test]
    fn test_process_fields() {
        let draft = ProcessDraft {
            name: "Invoice bot".into(),
            description: "short".into(),
            owner: Some("o".repeat(101)),
            ..ProcessDraft::default()
        };
        let errors = validate_process(&draft);
        assert_eq!(errors["description"], "Description must be at least 10 characters");
        assert!(errors.contains_key("owner"));
        assert!(!errors.contains_key("name"));
    }

    #[test]
    fn test_note_requires_content() {
        let errors = validate_note(&NoteDraft::new("Ideas", ""));
        assert_eq!(errors["content"], "Note content is required");
        assert!(validate_note(&NoteDraft::new("Ideas", "Try the new OCR step")).is_empty());
    }
}
