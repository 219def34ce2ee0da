//! Local Backend Integration Tests
//!
//! Gateway calls and full store flows against an in-memory SQLite database.

use std::rc::Rc;

use serde_json::json;
use workdesk_store::gateway::OrderUpdate;
use workdesk_store::{
    Clock, GatewayError, NoteDraft, ProcessStatus, StaticAuth, StoreConfig, StoreDeps, StoreError, SystemClock,
    TableGateway, TaskDraft, TaskPatch, TaskStore, TtlCache,
};
use workdesk_store::{NoteStore, Priority, ProcessStore};

use crate::{seed_demo, LocalDb, LocalGateway};

const OWNER: &str = "user-1";

fn setup_gateway() -> LocalGateway {
    let db = LocalDb::init(":memory:").expect("Failed to init test DB");
    LocalGateway::new(db)
}

fn deps(gateway: LocalGateway) -> StoreDeps {
    let clock: Rc<dyn Clock> = Rc::new(SystemClock);
    StoreDeps {
        gateway: Rc::new(gateway),
        auth: Rc::new(StaticAuth::user(OWNER)),
        cache: Rc::new(TtlCache::new(clock.clone())),
        clock,
        config: StoreConfig::new("http://localhost:54321", "anon"),
    }
}

#[tokio::test]
async fn test_insert_assigns_id_and_timestamps() {
    let gateway = setup_gateway();

    let row = gateway
        .insert("tasks", OWNER, json!({"title": "Write report", "priority": "high", "completed": false, "status": "Not Started", "display_order": 1}))
        .await
        .expect("Insert failed");

    assert_eq!(row["id"], "1");
    assert_eq!(row["title"], "Write report");
    assert_eq!(row["completed"], false);
    assert!(row["created_at"].is_string());
    assert_eq!(row["created_at"], row["updated_at"]);
    assert!(row["due_date"].is_null());
}

#[tokio::test]
async fn test_rows_are_scoped_to_their_owner() {
    let gateway = setup_gateway();
    gateway.insert("notes", OWNER, json!({"title": "Mine", "content": "hello there"})).await.unwrap();
    gateway.insert("notes", "user-2", json!({"title": "Theirs", "content": "hello there"})).await.unwrap();

    let mine = gateway.select("notes", OWNER).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["title"], "Mine");

    let other_id = gateway.select("notes", "user-2").await.unwrap()[0]["id"].as_str().unwrap().to_string();
    let err = gateway.update("notes", OWNER, &other_id, json!({"title": "Hijack"})).await.unwrap_err();
    assert!(matches!(err, GatewayError::NoRows { .. }));
}

#[tokio::test]
async fn test_select_orders_by_display_order() {
    let gateway = setup_gateway();
    for (title, order) in [("c", 3), ("a", 1), ("b", 2)] {
        gateway
            .insert("notes", OWNER, json!({"title": title, "content": "body text", "display_order": order}))
            .await
            .unwrap();
    }

    let titles: Vec<_> = gateway.select("notes", OWNER).await.unwrap().iter().map(|r| r["title"].clone()).collect();
    assert_eq!(titles, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_unknown_column_is_rejected() {
    let gateway = setup_gateway();
    let err = gateway
        .insert("notes", OWNER, json!({"title": "x", "content": "y", "priority": "high"}))
        .await
        .unwrap_err();
    assert_eq!(err.message(), "column \"priority\" of relation \"notes\" does not exist");
}

#[tokio::test]
async fn test_increment_and_bulk_reorder() {
    let gateway = setup_gateway();
    let a = gateway.insert("tasks", OWNER, json!({"title": "A", "display_order": 1})).await.unwrap();
    let b = gateway.insert("tasks", OWNER, json!({"title": "B", "display_order": 2})).await.unwrap();

    gateway.increment_display_order("tasks", OWNER).await.unwrap();
    let orders: Vec<_> = gateway.select("tasks", OWNER).await.unwrap().iter().map(|r| r["display_order"].clone()).collect();
    assert_eq!(orders, vec![json!(2), json!(3)]);

    let updates = vec![
        OrderUpdate { id: b["id"].as_str().unwrap().to_string(), display_order: 1 },
        OrderUpdate { id: a["id"].as_str().unwrap().to_string(), display_order: 2 },
    ];
    gateway.set_display_orders("tasks", OWNER, &updates).await.unwrap();
    let titles: Vec<_> = gateway.select("tasks", OWNER).await.unwrap().iter().map(|r| r["title"].clone()).collect();
    assert_eq!(titles, vec!["B", "A"]);
}

#[tokio::test]
async fn test_delete_missing_row_is_not_an_error() {
    let gateway = setup_gateway();
    gateway.delete("tasks", OWNER, "999").await.expect("Delete failed");
}

#[tokio::test]
async fn test_temporary_ids_never_reach_a_row() {
    let gateway = setup_gateway();
    let err = gateway.update("tasks", OWNER, "tmp-123", json!({"title": "x"})).await.unwrap_err();
    assert!(err.message().contains("invalid input syntax"));
}

#[tokio::test]
async fn test_seed_fills_empty_tables_once() {
    let gateway = setup_gateway();
    let first = seed_demo(&gateway, OWNER).await.unwrap();
    assert_eq!((first.tasks, first.notes, first.processes), (3, 2, 6));

    let second = seed_demo(&gateway, OWNER).await.unwrap();
    assert_eq!((second.tasks, second.notes, second.processes), (0, 0, 0));
}

// ========================
// Stores end to end
// ========================

#[tokio::test]
async fn test_task_store_round_trip() {
    let store = TaskStore::new(deps(setup_gateway()));
    store.load().await.unwrap();
    assert!(store.items().is_empty());

    let first = store.add(TaskDraft::new("First task", Priority::High)).await.unwrap();
    let second = store.add(TaskDraft::new("Second task", Priority::Low)).await.unwrap();
    assert_eq!(first.id, "1");
    assert_eq!(second.id, "2");

    // newest first
    let titles: Vec<_> = store.items().iter().map(|t| t.title.clone()).collect();
    assert_eq!(titles, vec!["Second task", "First task"]);

    store.toggle(&first.id).await.unwrap();
    let patch = TaskPatch {
        title: Some("Second task, renamed".into()),
        ..TaskPatch::default()
    };
    store.update(&second.id, patch).await.unwrap();
    store.refresh().await.unwrap();

    let reloaded = store.items();
    assert_eq!(reloaded.len(), 2);
    assert!(reloaded.iter().any(|t| t.id == first.id && t.completed));
    assert!(reloaded.iter().any(|t| t.title == "Second task, renamed"));
}

#[tokio::test]
async fn test_reorder_persists_to_the_database() {
    let store = NoteStore::new(deps(setup_gateway()));
    for title in ["Note one", "Note two", "Note three"] {
        store.add(NoteDraft::new(title, "Some body text")).await.unwrap();
    }
    // stored order is newest first: three, two, one
    store.move_item(0, 2).await.unwrap();
    store.refresh().await.unwrap();

    let titles: Vec<_> = store.items().iter().map(|n| n.title.clone()).collect();
    assert_eq!(titles, vec!["Note two", "Note one", "Note three"]);
}

#[tokio::test]
async fn test_seeded_processes_load_with_status() {
    let gateway = setup_gateway();
    seed_demo(&gateway, OWNER).await.unwrap();
    let store = ProcessStore::new(deps(gateway));
    store.load().await.unwrap();

    let processes = store.items();
    assert_eq!(processes.len(), 6);
    assert_eq!(processes[0].name, "Invoice Processing Automation");
    assert_eq!(processes[1].status, ProcessStatus::InProgress);
    assert_eq!(processes[0].entity_name.as_deref(), Some("Acme Corporation"));
}

#[tokio::test]
async fn test_store_reports_missing_tables() {
    let db = LocalDb::connect(":memory:").unwrap();
    let store = TaskStore::new(deps(LocalGateway::new(db)));

    let err = store.load().await.unwrap_err();
    assert_eq!(err, StoreError::SchemaMissing { table: "tasks".into() });
    assert!(store.error().unwrap().contains("database setup script"));
}

#[tokio::test]
async fn test_file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workdesk.db");

    let gateway = LocalGateway::new(LocalDb::init(&path).unwrap());
    gateway.insert("notes", OWNER, json!({"title": "Kept", "content": "still here"})).await.unwrap();
    drop(gateway);

    let reopened = LocalGateway::new(LocalDb::init(&path).unwrap());
    let rows = reopened.select("notes", OWNER).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "Kept");
}
