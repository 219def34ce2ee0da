//! Demo Data
//!
//! Fills an empty account with a few rows per table so the pages have
//! something to show.

use serde_json::{json, Value};
use workdesk_store::{GatewayResult, TableGateway};

use crate::gateway::LocalGateway;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub tasks: usize,
    pub notes: usize,
    pub processes: usize,
}

fn demo_tasks() -> Vec<Value> {
    vec![
        json!({"title": "Review quarterly budget", "priority": "high", "completed": false, "status": "In Progress", "due_date": "2024-09-30"}),
        json!({"title": "Update onboarding checklist", "priority": "medium", "completed": false, "status": "Not Started"}),
        json!({"title": "Archive old reports", "priority": "low", "completed": true, "status": "Completed"}),
    ]
}

fn demo_notes() -> Vec<Value> {
    vec![
        json!({"title": "Meeting notes", "content": "Discussed automation roadmap and owners for Q3."}),
        json!({"title": "Ideas", "content": "Bots for invoice matching and vendor onboarding."}),
    ]
}

fn demo_processes() -> Vec<Value> {
    vec![
        json!({
            "name": "Invoice Processing Automation",
            "description": "Automates the processing of vendor invoices from receipt to approval, including data extraction, validation, and routing to appropriate approvers.",
            "status": "active", "owner": "Finance Team", "department": "Finance",
            "entity_name": "Acme Corporation", "due_date": "2024-09-15"
        }),
        json!({
            "name": "Employee Onboarding Process",
            "description": "Streamlines new employee onboarding by automating account creation, document collection, and system access provisioning.",
            "status": "in-progress", "owner": "HR Department", "department": "HR",
            "entity_name": "Global Tech Solutions", "due_date": "2024-08-30"
        }),
        json!({
            "name": "Report Generation Bot",
            "description": "Automatically generates and distributes monthly financial reports to stakeholders, reducing manual effort and ensuring consistency.",
            "status": "completed", "owner": "IT Operations", "department": "IT",
            "entity_name": "TechFlow Industries", "due_date": "2024-07-20"
        }),
        json!({
            "name": "Customer Data Migration",
            "description": "Migrates customer data from legacy CRM system to new platform with data validation and error handling.",
            "status": "on-hold", "owner": "Sales Operations", "department": "Sales",
            "entity_name": "InnovaCorp Ltd", "due_date": "2024-10-10"
        }),
        json!({
            "name": "Purchase Order Automation",
            "description": "Automates purchase order processing from request to approval and vendor notification.",
            "status": "active", "owner": "Procurement Team", "department": "Procurement",
            "entity_name": "MegaCorp Industries", "due_date": "2024-09-01"
        }),
        json!({
            "name": "Quality Assurance Reporting",
            "description": "Automated quality assurance reporting system that compiles test results and generates compliance reports.",
            "status": "in-progress", "owner": "QA Team", "department": "Quality",
            "entity_name": "TechFlow Industries", "due_date": "2024-08-25"
        }),
    ]
}

async fn insert_all(gateway: &LocalGateway, table: &str, owner: &str, rows: Vec<Value>) -> GatewayResult<usize> {
    let count = rows.len();
    for (index, mut row) in rows.into_iter().enumerate() {
        if let Some(obj) = row.as_object_mut() {
            obj.insert("display_order".into(), json!(index + 1));
        }
        gateway.insert(table, owner, row).await?;
    }
    Ok(count)
}

/// Insert the demo rows for `owner`. Tables that already hold rows for the
/// owner are left alone.
pub async fn seed_demo(gateway: &LocalGateway, owner: &str) -> GatewayResult<SeedReport> {
    let mut report = SeedReport::default();
    if gateway.select("tasks", owner).await?.is_empty() {
        report.tasks = insert_all(gateway, "tasks", owner, demo_tasks()).await?;
    }
    if gateway.select("notes", owner).await?.is_empty() {
        report.notes = insert_all(gateway, "notes", owner, demo_notes()).await?;
    }
    if gateway.select("rpa_processes", owner).await?.is_empty() {
        report.processes = insert_all(gateway, "rpa_processes", owner, demo_processes()).await?;
    }
    log::info!("seeded demo data for {}: {:?}", owner, report);
    Ok(report)
}
