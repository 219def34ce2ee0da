//! Store Tests
//!
//! Driven against an in-memory gateway that can fail on demand and hold a
//! call open, so state during the async gap can be observed.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::channel::oneshot;
use futures::{pin_mut, poll};
use serde_json::{json, Value};

use super::*;
use crate::clock::manual::ManualClock;
use crate::domain::{NoteDraft, Priority, ProcessDraft, TaskDraft, TaskPatch, TaskStatus};
use crate::gateway::{GatewayError, GatewayResult, RemoteChange, StaticAuth};
use crate::query::{TaskFilter, TaskQuery};
use crate::reorder::{DragEnd, ReorderController};

const OWNER: &str = "u1";
const TS: &str = "2024-08-09T09:00:00+00:00";

// ========================
// Fake gateway
// ========================

struct FakeGateway {
    rows: RefCell<Vec<(String, Value)>>,
    next_id: Cell<u32>,
    failures: RefCell<VecDeque<GatewayError>>,
    hold: RefCell<Option<oneshot::Receiver<()>>>,
    calls: RefCell<Vec<String>>,
}

impl FakeGateway {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            rows: RefCell::new(Vec::new()),
            next_id: Cell::new(42),
            failures: RefCell::new(VecDeque::new()),
            hold: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
        })
    }

    fn seed(&self, table: &str, row: Value) {
        self.rows.borrow_mut().push((table.to_string(), row));
    }

    fn fail_next(&self, err: GatewayError) {
        self.failures.borrow_mut().push_back(err);
    }

    /// Block the next call until the returned sender fires
    fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.hold.borrow_mut() = Some(rx);
        tx
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn row(&self, table: &str, id: &str) -> Option<Value> {
        self.rows
            .borrow()
            .iter()
            .find(|(t, r)| t == table && r["id"] == id)
            .map(|(_, r)| r.clone())
    }

    async fn enter(&self, call: String) -> GatewayResult<()> {
        self.calls.borrow_mut().push(call);
        let gate = self.hold.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        match self.failures.borrow_mut().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn owned(table: &str, owner: &str, entry: &(String, Value)) -> bool {
        entry.0 == table && entry.1["user_id"] == owner
    }
}

#[async_trait(?Send)]
impl TableGateway for FakeGateway {
    async fn select(&self, table: &str, owner: &str) -> GatewayResult<Vec<Value>> {
        self.enter(format!("select {}", table)).await?;
        let mut rows: Vec<Value> = self
            .rows
            .borrow()
            .iter()
            .filter(|entry| Self::owned(table, owner, entry))
            .map(|(_, row)| row.clone())
            .collect();
        rows.sort_by_key(|row| row["display_order"].as_i64());
        Ok(rows)
    }

    async fn insert(&self, table: &str, owner: &str, mut row: Value) -> GatewayResult<Value> {
        self.enter(format!("insert {}", table)).await?;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        if let Some(obj) = row.as_object_mut() {
            obj.insert("id".into(), json!(id.to_string()));
            obj.insert("user_id".into(), json!(owner));
            for stamp in ["created_at", "updated_at", "last_edited", "last_modified"] {
                obj.insert(stamp.into(), json!(TS));
            }
        }
        self.rows.borrow_mut().push((table.to_string(), row.clone()));
        Ok(row)
    }

    async fn update(&self, table: &str, owner: &str, id: &str, patch: Value) -> GatewayResult<Value> {
        self.enter(format!("update {} {}", table, id)).await?;
        let mut rows = self.rows.borrow_mut();
        let (_, row) = rows
            .iter_mut()
            .find(|entry| Self::owned(table, owner, entry) && entry.1["id"] == id)
            .ok_or_else(|| GatewayError::NoRows { table: table.into(), id: id.into() })?;
        if let (Some(target), Some(changes)) = (row.as_object_mut(), patch.as_object()) {
            for (key, value) in changes {
                target.insert(key.clone(), value.clone());
            }
        }
        Ok(row.clone())
    }

    async fn delete(&self, table: &str, owner: &str, id: &str) -> GatewayResult<()> {
        self.enter(format!("delete {} {}", table, id)).await?;
        self.rows
            .borrow_mut()
            .retain(|entry| !(Self::owned(table, owner, entry) && entry.1["id"] == id));
        Ok(())
    }

    async fn increment_display_order(&self, table: &str, owner: &str) -> GatewayResult<()> {
        self.enter(format!("increment {}", table)).await?;
        for entry in self.rows.borrow_mut().iter_mut() {
            if Self::owned(table, owner, entry) {
                let order = entry.1["display_order"].as_i64().unwrap_or(0);
                entry.1["display_order"] = json!(order + 1);
            }
        }
        Ok(())
    }

    async fn set_display_orders(&self, table: &str, owner: &str, updates: &[OrderUpdate]) -> GatewayResult<()> {
        self.enter(format!("reorder {}", table)).await?;
        for entry in self.rows.borrow_mut().iter_mut() {
            if !Self::owned(table, owner, entry) {
                continue;
            }
            if let Some(update) = updates.iter().find(|u| entry.1["id"] == u.id.as_str()) {
                entry.1["display_order"] = json!(update.display_order);
            }
        }
        Ok(())
    }
}

// ========================
// Fixtures
// ========================

fn task_row(id: &str, title: &str, order: i32) -> Value {
    json!({
        "id": id,
        "user_id": OWNER,
        "title": title,
        "priority": "medium",
        "completed": false,
        "status": "Not Started",
        "start_date": null,
        "due_date": null,
        "display_order": order,
        "created_at": TS,
        "updated_at": TS
    })
}

fn note_row(id: &str, title: &str, order: i32) -> Value {
    json!({
        "id": id,
        "user_id": OWNER,
        "title": title,
        "content": "",
        "display_order": order,
        "created_at": TS,
        "last_edited": TS
    })
}

struct Harness {
    gateway: Rc<FakeGateway>,
    clock: Rc<ManualClock>,
    deps: StoreDeps,
}

impl Harness {
    fn new() -> Self {
        Self::with_auth(StaticAuth::user(OWNER))
    }

    fn with_auth(auth: StaticAuth) -> Self {
        let gateway = FakeGateway::new();
        let clock = Rc::new(ManualClock::new());
        let deps = StoreDeps {
            gateway: gateway.clone(),
            auth: Rc::new(auth),
            cache: Rc::new(TtlCache::new(clock.clone())),
            clock: clock.clone(),
            config: StoreConfig::new("http://localhost:54321", "anon"),
        };
        Self { gateway, clock, deps }
    }

    fn store<R: Resource>(&self) -> Rc<ResourceStore<R>> {
        Rc::new(ResourceStore::new(self.deps.clone()))
    }

    /// Task store loaded with rows titled by `titles`, ids "1".."n"
    async fn tasks(&self, titles: &[&str]) -> Rc<TaskStore> {
        for (index, title) in titles.iter().enumerate() {
            self.gateway
                .seed("tasks", task_row(&(index + 1).to_string(), title, index as i32));
        }
        let store = self.store::<Task>();
        store.load().await.unwrap();
        store
    }
}

fn titles(tasks: &[Task]) -> Vec<String> {
    tasks.iter().map(|t| t.title.clone()).collect()
}

fn orders(tasks: &[Task]) -> Vec<i32> {
    tasks.iter().map(|t| t.display_order).collect()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, 9).unwrap()
}

// ========================
// Load
// ========================

#[tokio::test]
async fn test_load_is_served_from_cache_until_refresh() {
    let h = Harness::new();
    let store = h.tasks(&["A", "B"]).await;
    assert_eq!(titles(&store.items()), vec!["A", "B"]);

    store.load().await.unwrap();
    assert_eq!(h.gateway.count("select"), 1);

    store.refresh().await.unwrap();
    assert_eq!(h.gateway.count("select"), 2);
}

#[tokio::test]
async fn test_expired_cache_goes_back_to_the_gateway() {
    let h = Harness::new();
    let store = h.tasks(&["A"]).await;

    h.clock.advance(Duration::from_secs(301));
    store.load().await.unwrap();
    assert_eq!(h.gateway.count("select"), 2);
}

#[tokio::test]
async fn test_signed_out_fails_fast() {
    let h = Harness::with_auth(StaticAuth::signed_out());
    let store = h.store::<Task>();

    assert_eq!(store.load().await, Err(StoreError::NotAuthenticated));
    assert_eq!(
        store.add(TaskDraft::new("Anything", Priority::Low)).await,
        Err(StoreError::NotAuthenticated)
    );
    assert_eq!(store.error().as_deref(), Some("User not authenticated"));
    assert!(store.items().is_empty());
    assert!(h.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_missing_table_surfaces_setup_message() {
    let h = Harness::new();
    h.gateway
        .fail_next(GatewayError::Rejected(r#"relation "public.notes" does not exist"#.into()));
    let store = h.store::<Note>();

    let err = store.load().await.unwrap_err();
    assert_eq!(err, StoreError::SchemaMissing { table: "notes".into() });
    assert!(store.error().unwrap().starts_with("Database table not found"));
    assert!(!store.is_loading());
}

// ========================
// Add
// ========================

#[tokio::test]
async fn test_add_is_optimistic_then_confirmed() {
    let h = Harness::new();
    let store = h.tasks(&["A", "B"]).await;

    let release = h.gateway.hold_next();
    let add = store.add(TaskDraft::new("C", Priority::Low));
    pin_mut!(add);
    assert!(poll!(add.as_mut()).is_pending());

    let pending = store.items();
    assert_eq!(titles(&pending), vec!["C", "A", "B"]);
    assert_eq!(orders(&pending), vec![0, 1, 2]);
    assert!(is_temporary_id(&pending[0].id));

    release.send(()).unwrap();
    let created = add.await.unwrap();

    let items = store.items();
    assert_eq!(items[0].id, created.id);
    assert_eq!(titles(&items), vec!["C", "A", "B"]);
    assert!(items.iter().all(|t| !is_temporary_id(&t.id)));
}

#[tokio::test]
async fn test_failed_add_restores_the_prior_list() {
    let h = Harness::new();
    let store = h.tasks(&["A", "B"]).await;
    let before = store.items();

    h.gateway
        .fail_next(GatewayError::Rejected("new row violates row-level security policy".into()));
    let err = store.add(TaskDraft::new("C", Priority::Low)).await.unwrap_err();

    assert_eq!(store.items(), before);
    assert_eq!(orders(&store.items()), vec![0, 1]);
    assert_eq!(
        err.to_string(),
        "Failed to create task: new row violates row-level security policy"
    );
    assert_eq!(store.error(), Some(err.to_string()));
}

#[tokio::test]
async fn test_transient_create_failure_is_retried_once() {
    let h = Harness::new();
    let store = h.tasks(&[]).await;

    h.gateway.fail_next(GatewayError::Transport("timed out".into()));
    store.add(TaskDraft::new("Retry me", Priority::High)).await.unwrap();

    assert_eq!(store.items().len(), 1);
    assert_eq!(h.gateway.count("increment"), 2);
    assert_eq!(*h.clock.slept.borrow(), vec![Duration::from_millis(500)]);
}

#[tokio::test]
async fn test_end_to_end_temporary_id_becomes_server_id() {
    let h = Harness::new();
    let store = h.tasks(&[]).await;
    assert!(store.items().is_empty());

    let release = h.gateway.hold_next();
    let add = store.add(TaskDraft::new("X", Priority::Low));
    pin_mut!(add);
    assert!(poll!(add.as_mut()).is_pending());

    let pending = store.items();
    assert_eq!(pending.len(), 1);
    assert!(is_temporary_id(&pending[0].id));

    release.send(()).unwrap();
    add.await.unwrap();

    let items = store.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "42");
    assert_eq!(items[0].priority, Priority::Low);
    assert!(h.gateway.row("tasks", "42").is_some());
}

#[tokio::test]
async fn test_subscribers_see_the_optimistic_step() {
    let h = Harness::new();
    let store = h.tasks(&[]).await;
    let seen = Rc::new(RefCell::new(Vec::new()));
    {
        let seen = seen.clone();
        let observed = store.clone();
        store.subscribe(move || seen.borrow_mut().push(observed.items().len()));
    }

    let release = h.gateway.hold_next();
    let add = store.add(TaskDraft::new("Watch me", Priority::Medium));
    pin_mut!(add);
    assert!(poll!(add.as_mut()).is_pending());
    assert_eq!(seen.borrow().last(), Some(&1));

    release.send(()).unwrap();
    add.await.unwrap();
    assert!(seen.borrow().len() >= 2);
}

// ========================
// Update / delete
// ========================

#[tokio::test]
async fn test_update_confirms_with_server_row() {
    let h = Harness::new();
    let store = h.tasks(&["A"]).await;

    let patch = TaskPatch {
        title: Some("Renamed".into()),
        ..TaskPatch::default()
    };
    let updated = store.update("1", patch).await.unwrap();

    assert_eq!(updated.title, "Renamed");
    assert_eq!(store.items()[0].title, "Renamed");
    assert_eq!(h.gateway.row("tasks", "1").unwrap()["title"], "Renamed");
}

#[tokio::test]
async fn test_repeated_update_failures_do_not_drift() {
    let h = Harness::new();
    let store = h.tasks(&["A", "B"]).await;
    let before = store.items();
    let patch = TaskPatch {
        title: Some("Changed".into()),
        priority: Some(Priority::High),
        ..TaskPatch::default()
    };

    for _ in 0..2 {
        h.gateway.fail_next(GatewayError::Http { status: 400, body: "bad request".into() });
        assert!(store.update("1", patch.clone()).await.is_err());
        assert_eq!(store.items(), before);
    }
}

#[tokio::test]
async fn test_update_unknown_id_makes_no_remote_call() {
    let h = Harness::new();
    let store = h.tasks(&["A"]).await;

    let err = store.update("nope", TaskPatch::default()).await.unwrap_err();
    assert_eq!(err, StoreError::NotFound { resource: "task", id: "nope".into() });
    assert_eq!(h.gateway.calls(), vec!["select tasks".to_string()]);
}

#[tokio::test]
async fn test_toggle_completes_and_reopens() {
    let h = Harness::new();
    let store = h.tasks(&["A"]).await;

    let done = store.toggle("1").await.unwrap();
    assert!(done.completed);
    assert_eq!(done.status, TaskStatus::Completed);
    assert_eq!(h.gateway.row("tasks", "1").unwrap()["completed"], true);

    let reopened = store.toggle("1").await.unwrap();
    assert!(!reopened.completed);
    assert_eq!(reopened.status, TaskStatus::NotStarted);
}

#[tokio::test]
async fn test_delete_rolls_back_then_succeeds() {
    let h = Harness::new();
    let store = h.tasks(&["A", "B"]).await;
    let before = store.items();

    h.gateway.fail_next(GatewayError::Transport("offline".into()));
    assert!(store.delete("1").await.is_err());
    assert_eq!(store.items(), before);

    store.delete("1").await.unwrap();
    assert_eq!(titles(&store.items()), vec!["B"]);
    assert!(h.gateway.row("tasks", "1").is_none());
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn test_calls_on_a_provisional_item_use_the_server_id() {
    let h = Harness::new();
    let store = h.tasks(&[]).await;

    let release = h.gateway.hold_next();
    let add = store.add(TaskDraft::new("X", Priority::Low));
    pin_mut!(add);
    assert!(poll!(add.as_mut()).is_pending());

    let temp_id = store.items()[0].id.clone();
    let patch = TaskPatch {
        title: Some("Y".into()),
        ..TaskPatch::default()
    };
    let update = store.update(&temp_id, patch);
    pin_mut!(update);
    assert!(poll!(update.as_mut()).is_pending());
    assert_eq!(store.items()[0].title, "Y");

    release.send(()).unwrap();
    let (created, updated) = futures::join!(add.as_mut(), update.as_mut());

    assert_eq!(created.unwrap().id, "42");
    assert_eq!(updated.unwrap().title, "Y");
    assert!(h.gateway.calls().contains(&"update tasks 42".to_string()));
    assert_eq!(store.items().len(), 1);
    assert_eq!(store.items()[0].id, "42");
}

#[tokio::test]
async fn test_update_on_an_unsaved_item_rolls_back_without_the_queue() {
    let mut h = Harness::new();
    h.deps.config.serialize_remote_calls = false;
    let store = h.tasks(&[]).await;

    let release = h.gateway.hold_next();
    let add = store.add(TaskDraft::new("X", Priority::Low));
    pin_mut!(add);
    assert!(poll!(add.as_mut()).is_pending());

    let temp_id = store.items()[0].id.clone();
    let patch = TaskPatch {
        title: Some("Y".into()),
        ..TaskPatch::default()
    };
    let err = store.update(&temp_id, patch).await.unwrap_err();
    assert_eq!(err, StoreError::NotSaved { resource: "task", id: temp_id.clone() });
    assert_eq!(store.items()[0].title, "X");
    assert_eq!(store.error(), Some(err.to_string()));

    release.send(()).unwrap();
    add.await.unwrap();
    assert_eq!(store.items()[0].id, "42");
    assert_eq!(h.gateway.count("update"), 0);
}

// ========================
// Overlapping calls
// ========================

#[tokio::test]
async fn test_failed_update_keeps_an_earlier_confirmed_add() {
    let h = Harness::new();
    let store = h.tasks(&["A", "B"]).await;

    let release = h.gateway.hold_next();
    let add = store.add(TaskDraft::new("C", Priority::Low));
    pin_mut!(add);
    assert!(poll!(add.as_mut()).is_pending());

    let patch = TaskPatch {
        title: Some("Renamed".into()),
        ..TaskPatch::default()
    };
    let update = store.update("1", patch);
    pin_mut!(update);
    assert!(poll!(update.as_mut()).is_pending());

    release.send(()).unwrap();
    assert_eq!(add.await.unwrap().id, "42");

    h.gateway.fail_next(GatewayError::Rejected("permission denied".into()));
    assert!(update.await.is_err());

    let local = store.items();
    assert_eq!(titles(&local), vec!["C", "A", "B"]);
    assert_eq!(local[0].id, "42");
    assert!(local.iter().all(|t| !is_temporary_id(&t.id)));

    store.refresh().await.unwrap();
    assert_eq!(store.items(), local);
}

#[tokio::test]
async fn test_failed_update_keeps_a_later_add() {
    let h = Harness::new();
    let store = h.tasks(&["A", "B"]).await;

    let release = h.gateway.hold_next();
    let patch = TaskPatch {
        title: Some("Renamed".into()),
        ..TaskPatch::default()
    };
    let update = store.update("1", patch);
    pin_mut!(update);
    assert!(poll!(update.as_mut()).is_pending());
    h.gateway.fail_next(GatewayError::Rejected("permission denied".into()));

    let add = store.add(TaskDraft::new("C", Priority::Low));
    pin_mut!(add);
    assert!(poll!(add.as_mut()).is_pending());

    release.send(()).unwrap();
    let (updated, created) = futures::join!(update.as_mut(), add.as_mut());
    assert!(updated.is_err());
    assert_eq!(created.unwrap().id, "42");

    let local = store.items();
    assert_eq!(titles(&local), vec!["C", "A", "B"]);
    assert_eq!(orders(&local), vec![0, 1, 2]);
    assert!(local.iter().all(|t| !is_temporary_id(&t.id)));

    store.refresh().await.unwrap();
    assert_eq!(store.items(), local);
}

#[tokio::test]
async fn test_failed_reorder_keeps_a_later_add() {
    let h = Harness::new();
    let store = h.tasks(&["A", "B", "C"]).await;

    let release = h.gateway.hold_next();
    let reorder = store.move_item(2, 0);
    pin_mut!(reorder);
    assert!(poll!(reorder.as_mut()).is_pending());
    h.gateway.fail_next(GatewayError::Http { status: 409, body: "conflict".into() });

    let add = store.add(TaskDraft::new("D", Priority::Low));
    pin_mut!(add);
    assert!(poll!(add.as_mut()).is_pending());
    assert_eq!(titles(&store.items()), vec!["D", "C", "A", "B"]);

    release.send(()).unwrap();
    let (moved, created) = futures::join!(reorder.as_mut(), add.as_mut());
    assert!(moved.is_err());
    assert_eq!(created.unwrap().id, "42");

    let local = store.items();
    assert_eq!(titles(&local), vec!["D", "A", "B", "C"]);
    store.refresh().await.unwrap();
    assert_eq!(store.items(), local);
}

#[tokio::test]
async fn test_failed_delete_returns_the_item_to_its_slot() {
    let h = Harness::new();
    let store = h.tasks(&["A", "B", "C"]).await;

    let release = h.gateway.hold_next();
    let delete = store.delete("2");
    pin_mut!(delete);
    assert!(poll!(delete.as_mut()).is_pending());
    assert_eq!(titles(&store.items()), vec!["A", "C"]);
    h.gateway.fail_next(GatewayError::Http { status: 403, body: "forbidden".into() });

    let patch = TaskPatch {
        title: Some("C2".into()),
        ..TaskPatch::default()
    };
    let update = store.update("3", patch);
    pin_mut!(update);
    assert!(poll!(update.as_mut()).is_pending());

    release.send(()).unwrap();
    let (deleted, updated) = futures::join!(delete.as_mut(), update.as_mut());
    assert!(deleted.is_err());
    assert_eq!(updated.unwrap().title, "C2");
    assert_eq!(titles(&store.items()), vec!["A", "B", "C2"]);
}

// ========================
// Reorder
// ========================

#[tokio::test]
async fn test_move_item_renumbers_and_persists() {
    let h = Harness::new();
    let store = h.tasks(&["A", "B", "C", "D"]).await;

    store.move_item(0, 2).await.unwrap();
    assert_eq!(titles(&store.items()), vec!["B", "C", "A", "D"]);
    assert_eq!(orders(&store.items()), vec![0, 1, 2, 3]);

    store.refresh().await.unwrap();
    assert_eq!(titles(&store.items()), vec!["B", "C", "A", "D"]);
}

#[tokio::test]
async fn test_reorder_requires_a_full_permutation() {
    let h = Harness::new();
    let store = h.tasks(&["A", "B", "C"]).await;
    let before = store.items();

    for order in [vec!["1", "2"], vec!["1", "1", "2"], vec!["1", "2", "9"]] {
        let order = order.into_iter().map(String::from).collect();
        assert_eq!(store.reorder(order).await, Err(StoreError::InvalidReorder));
        assert_eq!(store.items(), before);
    }
    assert_eq!(h.gateway.count("reorder"), 0);
}

#[tokio::test]
async fn test_failed_reorder_restores_order() {
    let h = Harness::new();
    let store = h.tasks(&["A", "B", "C"]).await;
    let before = store.items();

    h.gateway.fail_next(GatewayError::Http { status: 503, body: "unavailable".into() });
    assert!(store.move_item(2, 0).await.is_err());
    assert_eq!(store.items(), before);
}

#[tokio::test]
async fn test_controller_applies_drops_on_the_rendered_list() {
    let h = Harness::new();
    let store = h.tasks(&["A", "B", "C"]).await;
    let controller = ReorderController::new(store.clone());

    let moved = controller
        .on_drag_end(DragEnd::new("1", Some("3".into())), today())
        .await
        .unwrap();
    assert!(moved);
    assert_eq!(titles(&store.items()), vec!["B", "C", "A"]);

    let noop = controller.on_drag_end(DragEnd::new("1", None), today()).await.unwrap();
    assert!(!noop);
}

#[tokio::test]
async fn test_controller_is_disabled_while_filtered() {
    let h = Harness::new();
    let store = h.tasks(&["A", "B"]).await;
    store.set_query(TaskQuery::new(TaskFilter::Pending, ""));
    let controller = ReorderController::new(store.clone());

    assert!(!controller.enabled());
    let moved = controller
        .on_drag_end(DragEnd::new("1", Some("2".into())), today())
        .await
        .unwrap();
    assert!(!moved);
    assert_eq!(h.gateway.count("reorder"), 0);
}

// ========================
// Realtime changes
// ========================

#[tokio::test]
async fn test_remote_insert_reloads_in_server_order() {
    let h = Harness::new();
    let store = h.tasks(&["A"]).await;

    let row = task_row("9", "From phone", 1);
    h.gateway.seed("tasks", row.clone());
    store.apply_remote_change(RemoteChange::Inserted(row)).await.unwrap();

    assert_eq!(h.gateway.count("select"), 2);
    assert_eq!(titles(&store.items()), vec!["A", "From phone"]);
}

#[tokio::test]
async fn test_remote_update_replaces_by_id() {
    let h = Harness::new();
    let store = h.tasks(&["A", "B"]).await;
    assert!(h.deps.cache.contains(&crate::cache::cache_keys::tasks(OWNER)));

    let mut row = task_row("2", "B edited elsewhere", 1);
    row["completed"] = json!(true);
    row["status"] = json!("Completed");
    store.apply_remote_change(RemoteChange::Updated(row)).await.unwrap();

    let b = store.get("2").unwrap();
    assert_eq!(b.title, "B edited elsewhere");
    assert!(b.completed);
    assert_eq!(titles(&store.items()), vec!["A", "B edited elsewhere"]);
    assert!(!h.deps.cache.contains(&crate::cache::cache_keys::tasks(OWNER)));

    // rows this session never loaded are ignored
    store
        .apply_remote_change(RemoteChange::Updated(task_row("77", "Stranger", 5)))
        .await
        .unwrap();
    assert_eq!(store.items().len(), 2);
    assert_eq!(h.gateway.count("select"), 1);
}

#[tokio::test]
async fn test_remote_delete_removes_by_id() {
    let h = Harness::new();
    let store = h.tasks(&["A", "B"]).await;

    store
        .apply_remote_change(RemoteChange::Deleted { id: "1".into() })
        .await
        .unwrap();
    assert_eq!(titles(&store.items()), vec!["B"]);

    store
        .apply_remote_change(RemoteChange::Deleted { id: "missing".into() })
        .await
        .unwrap();
    assert_eq!(titles(&store.items()), vec!["B"]);
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn test_malformed_remote_update_sets_the_error() {
    let h = Harness::new();
    let store = h.tasks(&["A"]).await;

    let err = store
        .apply_remote_change(RemoteChange::Updated(json!({ "id": "1" })))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Decode { table: "tasks", .. }));
    assert_eq!(titles(&store.items()), vec!["A"]);
    assert_eq!(store.error(), Some(err.to_string()));
}

// ========================
// Other resources
// ========================

#[tokio::test]
async fn test_notes_and_processes_keep_separate_cache_entries() {
    let h = Harness::new();
    h.gateway.seed("notes", note_row("n1", "Ideas", 0));
    let notes = h.store::<Note>();
    let processes = h.store::<RpaProcess>();

    notes.load().await.unwrap();
    processes.load().await.unwrap();
    assert!(h.deps.cache.contains(&crate::cache::cache_keys::notes(OWNER)));
    assert!(h.deps.cache.contains(&crate::cache::cache_keys::rpa_processes(OWNER)));

    notes.add(NoteDraft::new("Meeting", "Discuss OCR rollout")).await.unwrap();
    assert!(!h.deps.cache.contains(&crate::cache::cache_keys::notes(OWNER)));
    assert!(h.deps.cache.contains(&crate::cache::cache_keys::rpa_processes(OWNER)));
    assert_eq!(notes.items()[0].title, "Meeting");
    assert_eq!(notes.items()[1].display_order, 1);

    let draft = ProcessDraft {
        name: "Invoice Processing".into(),
        description: "Automates vendor invoice intake".into(),
        department: Some("Finance".into()),
        ..ProcessDraft::default()
    };
    let created = processes.add(draft).await.unwrap();
    assert_eq!(created.department.as_deref(), Some("Finance"));
    assert_eq!(h.gateway.row("rpa_processes", &created.id).unwrap()["status"], "active");
}

#[tokio::test]
async fn test_search_narrows_visible_items_only() {
    let h = Harness::new();
    let store = h.tasks(&["Reconcile bank", "Email vendor"]).await;

    store.set_search("bank");
    assert_eq!(titles(&store.visible(today())), vec!["Reconcile bank"]);
    assert_eq!(store.items().len(), 2);
}
