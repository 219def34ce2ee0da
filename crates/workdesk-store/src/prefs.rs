//! Layout Preferences
//!
//! Per-page list/grid choice kept in browser key/value storage. Storage
//! failures never block the page: reads fall back to the default and
//! writes are dropped with a warning.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreferenceError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read {key}: {message}")]
    Read { key: String, message: String },
    #[error("failed to write {key}: {message}")]
    Write { key: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

impl ViewMode {
    pub fn toggled(&self) -> Self {
        match self {
            ViewMode::List => ViewMode::Grid,
            ViewMode::Grid => ViewMode::List,
        }
    }
}

/// Pages whose layout is remembered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutPage {
    Tasks,
    Notes,
    Processes,
}

impl LayoutPage {
    pub fn storage_key(&self) -> &'static str {
        match self {
            LayoutPage::Tasks => "tasks-layout",
            LayoutPage::Notes => "notes-layout",
            LayoutPage::Processes => "processes-layout",
        }
    }
}

/// String key/value storage (browser localStorage or an in-memory map)
pub trait PreferenceStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PreferenceError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Storage that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl PreferenceStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Clone)]
pub struct LayoutPreferences {
    storage: Rc<dyn PreferenceStorage>,
}

impl LayoutPreferences {
    pub fn new(storage: Rc<dyn PreferenceStorage>) -> Self {
        Self { storage }
    }

    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryStorage::default()))
    }

    /// Stored view for `page`, `List` when missing or unreadable
    pub fn load(&self, page: LayoutPage) -> ViewMode {
        let key = page.storage_key();
        match self.storage.get_item(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Error reading layout preference {}: {}", key, e);
                ViewMode::default()
            }),
            Ok(None) => ViewMode::default(),
            Err(e) => {
                log::warn!("Error reading layout preference {}: {}", key, e);
                ViewMode::default()
            }
        }
    }

    pub fn save(&self, page: LayoutPage, mode: ViewMode) {
        let key = page.storage_key();
        let raw = match serde_json::to_string(&mode) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Error encoding layout preference {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = self.storage.set_item(key, &raw) {
            log::warn!("Error saving layout preference {}: {}", key, e);
        }
    }
}
