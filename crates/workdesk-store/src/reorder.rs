//! Reorder Controller
//!
//! Turns a finished drag (active item dropped over another) into a full new
//! ordering and hands it to the store.

use std::rc::Rc;

use chrono::NaiveDate;

use crate::domain::Resource;
use crate::error::StoreResult;
use crate::query::ViewQuery;
use crate::store::ResourceStore;

/// Move the element at `from` to `to`, keeping everything else in order.
/// Out-of-range indices leave the list unchanged.
pub fn array_move<T>(mut list: Vec<T>, from: usize, to: usize) -> Vec<T> {
    if from >= list.len() || to >= list.len() || from == to {
        return list;
    }
    let item = list.remove(from);
    list.insert(to, item);
    list
}

/// A drop: the dragged item and the item it was released over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEnd {
    pub active_id: String,
    pub over_id: Option<String>,
}

impl DragEnd {
    pub fn new(active_id: impl Into<String>, over_id: Option<String>) -> Self {
        Self {
            active_id: active_id.into(),
            over_id,
        }
    }

    /// Source and destination index in `ids`, or `None` when the drop
    /// changes nothing
    pub fn indices(&self, ids: &[String]) -> Option<(usize, usize)> {
        let over_id = self.over_id.as_deref()?;
        if over_id == self.active_id {
            return None;
        }
        let from = ids.iter().position(|id| *id == self.active_id)?;
        let to = ids.iter().position(|id| id == over_id)?;
        Some((from, to))
    }
}

pub struct ReorderController<R: Resource> {
    store: Rc<ResourceStore<R>>,
}

impl<R: Resource> Clone for ReorderController<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<R: Resource> ReorderController<R> {
    pub fn new(store: Rc<ResourceStore<R>>) -> Self {
        Self { store }
    }

    /// Dragging is only offered over the unfiltered list
    pub fn enabled(&self) -> bool {
        !self.store.query().is_active()
    }

    /// Apply a drop to the list as rendered. Returns whether a reorder was
    /// issued.
    pub async fn on_drag_end(&self, event: DragEnd, today: NaiveDate) -> StoreResult<bool> {
        if !self.enabled() {
            log::debug!("drop ignored: {} list is filtered", R::LABEL);
            return Ok(false);
        }
        let ids: Vec<String> = self.store.visible(today).iter().map(|item| item.id().to_string()).collect();
        let Some((from, to)) = event.indices(&ids) else {
            return Ok(false);
        };
        self.store.reorder(array_move(ids, from, to)).await?;
        Ok(true)
    }
}
