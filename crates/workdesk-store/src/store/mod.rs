//! Resource Stores
//!
//! One optimistic store per resource type. Every mutator follows the same
//! steps: change local state, call the gateway, then confirm with the server
//! row or undo that one change and record the error. Undo only touches what
//! the failed call changed, so calls that succeeded meanwhile stay applied.
//!
//! Local changes are applied before the first await so the UI shows them
//! immediately. Remote calls of one store go through a FIFO lane, so a call
//! issued against a provisional item runs after that item's create and is
//! sent with the server id.

#[cfg(test)]
mod tests;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};

use crate::cache::TtlCache;
use crate::clock::Clock;
use crate::config::StoreConfig;
use crate::domain::{is_temporary_id, temporary_id, Note, Resource, RpaProcess, Task};
use crate::error::{StoreError, StoreResult};
use crate::gateway::{AuthProvider, OrderUpdate, RemoteChange, TableGateway, UserId};
use crate::query::ViewQuery;
use crate::retry::Mutation;

pub type TaskStore = ResourceStore<Task>;
pub type NoteStore = ResourceStore<Note>;
pub type ProcessStore = ResourceStore<RpaProcess>;

/// Everything a store needs from the outside, built once per app
#[derive(Clone)]
pub struct StoreDeps {
    pub gateway: Rc<dyn TableGateway>,
    pub auth: Rc<dyn AuthProvider>,
    pub cache: Rc<TtlCache>,
    pub clock: Rc<dyn Clock>,
    pub config: StoreConfig,
}

struct StoreState<R: Resource> {
    /// Kept in display order
    items: Vec<R>,
    query: R::Query,
    loading: bool,
    error: Option<String>,
}

/// A position this store wrote locally, kept so it can be taken back
struct OrderChange {
    id: String,
    before: i32,
    after: i32,
}

pub struct ResourceStore<R: Resource> {
    deps: StoreDeps,
    state: RefCell<StoreState<R>>,
    listeners: RefCell<Vec<Rc<dyn Fn()>>>,
    lane: Mutex<()>,
    /// temporary id -> server id, for calls issued before a create confirmed
    aliases: RefCell<HashMap<String, String>>,
}

fn plural(label: &str) -> String {
    if label.ends_with('s') {
        format!("{}es", label)
    } else {
        format!("{}s", label)
    }
}

fn encode<T: Serialize>(table: &'static str, value: &T) -> StoreResult<Value> {
    serde_json::to_value(value).map_err(|e| StoreError::Decode {
        table,
        message: e.to_string(),
    })
}

fn decode<R: Resource>(row: Value) -> StoreResult<R> {
    serde_json::from_value::<R::Row>(row)
        .map(R::from_row)
        .map_err(|e| StoreError::Decode {
            table: R::TABLE,
            message: e.to_string(),
        })
}

impl<R: Resource> ResourceStore<R> {
    pub fn new(deps: StoreDeps) -> Self {
        Self {
            deps,
            state: RefCell::new(StoreState {
                items: Vec::new(),
                query: R::Query::default(),
                loading: false,
                error: None,
            }),
            listeners: RefCell::new(Vec::new()),
            lane: Mutex::new(()),
            aliases: RefCell::new(HashMap::new()),
        }
    }

    // ========================
    // Reads
    // ========================

    pub fn items(&self) -> Vec<R> {
        self.state.borrow().items.clone()
    }

    pub fn get(&self, id: &str) -> Option<R> {
        let resolved = self.resolve(id);
        self.state
            .borrow()
            .items
            .iter()
            .find(|item| item.id() == id || item.id() == resolved)
            .cloned()
    }

    /// Items after the current filter/search, in render order
    pub fn visible(&self, today: NaiveDate) -> Vec<R> {
        let state = self.state.borrow();
        state.query.apply(&state.items, today)
    }

    pub fn query(&self) -> R::Query {
        self.state.borrow().query.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Call `listener` after every state change
    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    // ========================
    // Local-only changes
    // ========================

    pub fn set_query(&self, query: R::Query) {
        self.state.borrow_mut().query = query;
        self.notify();
    }

    pub fn set_search(&self, search: impl Into<String>) {
        self.state.borrow_mut().query.set_search(search.into());
        self.notify();
    }

    pub fn clear_error(&self) {
        self.state.borrow_mut().error = None;
        self.notify();
    }

    // ========================
    // Remote operations
    // ========================

    /// Load the owner's items, from the cache when it is still live
    pub async fn load(&self) -> StoreResult<()> {
        let owner = self.owner()?;
        let key = R::cache_key(&owner);
        if let Some(cached) = self.deps.cache.get::<Vec<R>>(&key) {
            log::debug!("{} served from cache", key);
            {
                let mut state = self.state.borrow_mut();
                state.items = cached;
                state.error = None;
            }
            self.notify();
            return Ok(());
        }

        self.state.borrow_mut().loading = true;
        self.notify();

        let _lane = self.remote_lane().await;
        let result = self.fetch(&owner).await;
        self.state.borrow_mut().loading = false;
        match result {
            Ok(items) => {
                log::info!("loaded {} {}", items.len(), plural(R::LABEL));
                self.deps.cache.set(key, items.clone(), self.deps.config.cache_ttl());
                {
                    let mut state = self.state.borrow_mut();
                    state.items = items;
                    state.error = None;
                }
                self.notify();
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Drop the cached list and load again
    pub async fn refresh(&self) -> StoreResult<()> {
        self.invalidate_current();
        self.load().await
    }

    /// Create an item at the top of the list
    pub async fn add(&self, draft: R::Draft) -> StoreResult<R> {
        let owner = self.owner()?;
        let temp_id = temporary_id();
        let mut shifted = Vec::new();
        {
            let mut state = self.state.borrow_mut();
            for (index, item) in state.items.iter_mut().enumerate() {
                shifted.push(OrderChange {
                    id: item.id().to_string(),
                    before: item.display_order(),
                    after: index as i32 + 1,
                });
                item.set_display_order(index as i32 + 1);
            }
            let provisional = R::provisional(temp_id.clone(), &draft, 0, self.deps.clock.now());
            state.items.insert(0, provisional);
            state.error = None;
        }
        self.notify();

        let _lane = self.remote_lane().await;
        match self.create_remote(&owner, &draft).await {
            Ok(created) => {
                log::info!("{} {} confirmed as {}", R::LABEL, temp_id, created.id());
                self.aliases.borrow_mut().insert(temp_id.clone(), created.id().to_string());
                {
                    let mut state = self.state.borrow_mut();
                    // gone if it was deleted while the create was in flight
                    if let Some(slot) = state.items.iter_mut().find(|item| item.id() == temp_id) {
                        *slot = created.clone();
                    }
                }
                self.invalidate(&owner);
                self.notify();
                Ok(created)
            }
            Err(e) => Err(self.rollback(e, |items| {
                items.retain(|item| item.id() != temp_id);
                self.restore_orders(items, &shifted);
            })),
        }
    }

    pub async fn update(&self, id: &str, patch: R::Patch) -> StoreResult<R> {
        let owner = self.owner()?;
        let now = self.deps.clock.now();
        let resolved = self.resolve(id);
        let previous = {
            let mut state = self.state.borrow_mut();
            let previous = match state.items.iter_mut().find(|item| item.id() == id || item.id() == resolved) {
                Some(item) => {
                    let previous = item.clone();
                    item.apply_patch(&patch, now);
                    Some(previous)
                }
                None => None,
            };
            if previous.is_some() {
                state.error = None;
            }
            previous
        };
        let Some(previous) = previous else {
            return Err(self.fail(self.not_found(id)));
        };
        self.notify();

        let _lane = self.remote_lane().await;
        let remote_id = self.resolve(id);
        if is_temporary_id(&remote_id) {
            let err = self.unconfirmed(&remote_id);
            return Err(self.rollback(err, |items| Self::restore_item(items, &previous)));
        }
        let result = async {
            let body = encode(R::TABLE, &R::update_row(&patch, now))?;
            let row = self
                .deps
                .config
                .retry
                .run(Mutation::Update, self.deps.clock.as_ref(), || {
                    self.deps.gateway.update(R::TABLE, &owner, &remote_id, body.clone())
                })
                .await
                .map_err(|e| StoreError::from_gateway(&e, &format!("update {}", R::LABEL), R::TABLE))?;
            decode::<R>(row)
        }
        .await;

        match result {
            Ok(updated) => {
                {
                    let mut state = self.state.borrow_mut();
                    if let Some(slot) = state.items.iter_mut().find(|item| item.id() == remote_id) {
                        *slot = updated.clone();
                    }
                }
                self.invalidate(&owner);
                self.notify();
                Ok(updated)
            }
            Err(e) => Err(self.rollback(e, |items| Self::restore_item(items, &previous))),
        }
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let owner = self.owner()?;
        let resolved = self.resolve(id);
        let removed = {
            let mut state = self.state.borrow_mut();
            let position = state.items.iter().position(|item| item.id() == id || item.id() == resolved);
            position.map(|index| {
                state.error = None;
                (index, state.items.remove(index))
            })
        };
        let Some((index, mut removed)) = removed else {
            return Err(self.fail(self.not_found(id)));
        };
        self.notify();

        let _lane = self.remote_lane().await;
        let remote_id = self.resolve(id);
        if is_temporary_id(&remote_id) {
            // create never reached the server, nothing to delete there
            return Ok(());
        }
        let result = self
            .deps
            .config
            .retry
            .run(Mutation::Delete, self.deps.clock.as_ref(), || {
                self.deps.gateway.delete(R::TABLE, &owner, &remote_id)
            })
            .await
            .map_err(|e| StoreError::from_gateway(&e, &format!("delete {}", R::LABEL), R::TABLE));

        match result {
            Ok(()) => {
                log::info!("{} {} deleted", R::LABEL, remote_id);
                self.state.borrow_mut().items.retain(|item| item.id() != remote_id);
                self.invalidate(&owner);
                self.notify();
                Ok(())
            }
            Err(e) => Err(self.rollback(e, |items| {
                // the create confirmed while this delete waited
                removed.set_id(remote_id.clone());
                let index = index.min(items.len());
                items.insert(index, removed);
            })),
        }
    }

    /// Persist a new manual order; `new_order` lists every current id once
    pub async fn reorder(&self, new_order: Vec<String>) -> StoreResult<()> {
        let owner = self.owner()?;
        let current = self.items();
        let Some(reordered) = Self::permute(&current, &new_order) else {
            return Err(self.fail(StoreError::InvalidReorder));
        };
        let moved: Vec<OrderChange> = reordered
            .iter()
            .filter_map(|item| {
                let before = current.iter().find(|old| old.id() == item.id())?.display_order();
                Some(OrderChange {
                    id: item.id().to_string(),
                    before,
                    after: item.display_order(),
                })
            })
            .collect();
        {
            let mut state = self.state.borrow_mut();
            state.items = reordered;
            state.error = None;
        }
        self.notify();

        let _lane = self.remote_lane().await;
        let updates: Vec<OrderUpdate> = new_order
            .iter()
            .enumerate()
            .map(|(index, id)| OrderUpdate {
                id: self.resolve(id),
                display_order: index as i32,
            })
            .filter(|update| !is_temporary_id(&update.id))
            .collect();

        let result = self
            .deps
            .config
            .retry
            .run(Mutation::Reorder, self.deps.clock.as_ref(), || {
                self.deps.gateway.set_display_orders(R::TABLE, &owner, &updates)
            })
            .await
            .map_err(|e| StoreError::from_gateway(&e, &format!("reorder {}", plural(R::LABEL)), R::TABLE));

        match result {
            Ok(()) => {
                {
                    let orders: HashMap<&str, i32> =
                        updates.iter().map(|u| (u.id.as_str(), u.display_order)).collect();
                    let mut state = self.state.borrow_mut();
                    for item in state.items.iter_mut() {
                        if let Some(order) = orders.get(item.id()) {
                            item.set_display_order(*order);
                        }
                    }
                    state.items.sort_by_key(|item| item.display_order());
                }
                self.invalidate(&owner);
                self.notify();
                Ok(())
            }
            Err(e) => Err(self.rollback(e, |items| self.restore_orders(items, &moved))),
        }
    }

    /// Fold in a change pushed by the realtime channel. Inserts reload the
    /// list so positions match the server.
    pub async fn apply_remote_change(&self, change: RemoteChange) -> StoreResult<()> {
        match change {
            RemoteChange::Inserted(_) => self.refresh().await,
            RemoteChange::Updated(row) => {
                let updated = decode::<R>(row).map_err(|e| self.fail(e))?;
                log::debug!("remote update of {} {}", R::LABEL, updated.id());
                {
                    let mut state = self.state.borrow_mut();
                    let Some(slot) = state.items.iter_mut().find(|item| item.id() == updated.id()) else {
                        return Ok(());
                    };
                    *slot = updated;
                    state.items.sort_by_key(|item| item.display_order());
                }
                self.invalidate_current();
                self.notify();
                Ok(())
            }
            RemoteChange::Deleted { id } => {
                let removed = {
                    let mut state = self.state.borrow_mut();
                    let before = state.items.len();
                    state.items.retain(|item| item.id() != id);
                    state.items.len() < before
                };
                if removed {
                    log::debug!("remote delete of {} {}", R::LABEL, id);
                    self.invalidate_current();
                    self.notify();
                }
                Ok(())
            }
        }
    }

    /// Move one item by index in the stored order
    pub async fn move_item(&self, from: usize, to: usize) -> StoreResult<()> {
        let ids: Vec<String> = self.state.borrow().items.iter().map(|item| item.id().to_string()).collect();
        if from >= ids.len() || to >= ids.len() {
            return Err(self.fail(StoreError::InvalidReorder));
        }
        self.reorder(crate::reorder::array_move(ids, from, to)).await
    }

    // ========================
    // Internals
    // ========================

    fn owner(&self) -> StoreResult<UserId> {
        match self.deps.auth.current_user() {
            Some(owner) => Ok(owner),
            None => Err(self.fail(StoreError::NotAuthenticated)),
        }
    }

    async fn remote_lane(&self) -> Option<MutexGuard<'_, ()>> {
        if self.deps.config.serialize_remote_calls {
            Some(self.lane.lock().await)
        } else {
            None
        }
    }

    fn resolve(&self, id: &str) -> String {
        self.aliases.borrow().get(id).cloned().unwrap_or_else(|| id.to_string())
    }

    fn invalidate(&self, owner: &str) {
        self.deps.cache.delete(&R::cache_key(owner));
    }

    fn invalidate_current(&self) {
        if let Some(owner) = self.deps.auth.current_user() {
            self.invalidate(&owner);
        }
    }

    fn not_found(&self, id: &str) -> StoreError {
        StoreError::NotFound {
            resource: R::LABEL,
            id: id.to_string(),
        }
    }

    /// The provisional item this call targets has no server row (yet)
    fn unconfirmed(&self, id: &str) -> StoreError {
        log::warn!("{} {} was never created, skipping remote call", R::LABEL, id);
        StoreError::NotSaved {
            resource: R::LABEL,
            id: id.to_string(),
        }
    }

    /// Undo one failed call's local change, then record the error
    fn rollback(&self, err: StoreError, undo: impl FnOnce(&mut Vec<R>)) -> StoreError {
        undo(&mut self.state.borrow_mut().items);
        self.fail(err)
    }

    /// Put back the pre-patch copy unless the slot was confirmed since.
    /// Keeps the slot's current position.
    fn restore_item(items: &mut [R], previous: &R) {
        if let Some(slot) = items.iter_mut().find(|item| item.id() == previous.id()) {
            let order = slot.display_order();
            *slot = previous.clone();
            slot.set_display_order(order);
        }
    }

    /// Take back the offset each change added. Shifts made by later calls
    /// (a newer add moving everything down) stay in place.
    fn restore_orders(&self, items: &mut [R], changes: &[OrderChange]) {
        for change in changes {
            let resolved = self.resolve(&change.id);
            let slot = items.iter_mut().find(|item| item.id() == change.id || item.id() == resolved);
            if let Some(item) = slot {
                item.set_display_order(item.display_order() - change.after + change.before);
            }
        }
        items.sort_by_key(|item| item.display_order());
    }

    /// Record the error and hand it back
    fn fail(&self, err: StoreError) -> StoreError {
        log::error!("{} store: {}", R::LABEL, err);
        self.state.borrow_mut().error = Some(err.to_string());
        self.notify();
        err
    }

    fn notify(&self) {
        let listeners: Vec<Rc<dyn Fn()>> = self.listeners.borrow().clone();
        for listener in listeners {
            listener();
        }
    }

    /// `items` rearranged into `order` with fresh 0-based positions, or
    /// `None` unless `order` names every item exactly once
    fn permute(items: &[R], order: &[String]) -> Option<Vec<R>> {
        if order.len() != items.len() {
            return None;
        }
        let unique: HashSet<&str> = order.iter().map(String::as_str).collect();
        if unique.len() != order.len() {
            return None;
        }
        let mut by_id: HashMap<&str, &R> = items.iter().map(|item| (item.id(), item)).collect();
        order
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let mut item = by_id.remove(id.as_str())?.clone();
                item.set_display_order(index as i32);
                Some(item)
            })
            .collect()
    }

    async fn fetch(&self, owner: &str) -> StoreResult<Vec<R>> {
        let rows = self
            .deps
            .gateway
            .select(R::TABLE, owner)
            .await
            .map_err(|e| StoreError::from_gateway(&e, &format!("load {}", plural(R::LABEL)), R::TABLE))?;
        let mut items = rows.into_iter().map(decode::<R>).collect::<StoreResult<Vec<R>>>()?;
        items.sort_by_key(|item| item.display_order());
        Ok(items)
    }

    async fn create_remote(&self, owner: &str, draft: &R::Draft) -> StoreResult<R> {
        let action = format!("create {}", R::LABEL);
        let retry = &self.deps.config.retry;
        let clock = self.deps.clock.as_ref();
        let gateway = self.deps.gateway.as_ref();

        retry
            .run(Mutation::Create, clock, || gateway.increment_display_order(R::TABLE, owner))
            .await
            .map_err(|e| StoreError::from_gateway(&e, &action, R::TABLE))?;

        let row = encode(R::TABLE, &R::insert_row(draft, 0))?;
        let stored = retry
            .run(Mutation::Create, clock, || gateway.insert(R::TABLE, owner, row.clone()))
            .await
            .map_err(|e| StoreError::from_gateway(&e, &action, R::TABLE))?;
        decode::<R>(stored)
    }
}

impl ResourceStore<Task> {
    /// Flip completion (status follows)
    pub async fn toggle(&self, id: &str) -> StoreResult<Task> {
        let Some(task) = self.get(id) else {
            return Err(self.fail(self.not_found(id)));
        };
        self.update(id, task.toggle_patch()).await
    }
}
