//! Application Context
//!
//! Stores and preferences provided via Leptos Context API. Each store bumps
//! its version signal on every change so views re-read it.

use std::rc::Rc;

use leptos::prelude::*;
use workdesk_store::{LayoutPreferences, NoteStore, ProcessStore, TaskStore};

use crate::services::Services;

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    tasks: StoredValue<Rc<TaskStore>, LocalStorage>,
    notes: StoredValue<Rc<NoteStore>, LocalStorage>,
    processes: StoredValue<Rc<ProcessStore>, LocalStorage>,
    prefs: StoredValue<LayoutPreferences, LocalStorage>,
    /// Bumped whenever the task store changes
    pub tasks_version: ReadSignal<u32>,
    pub notes_version: ReadSignal<u32>,
    pub processes_version: ReadSignal<u32>,
    pub signed_in: bool,
}

fn version_signal(subscribe: impl FnOnce(Box<dyn Fn()>)) -> ReadSignal<u32> {
    let (version, set_version) = signal(0u32);
    subscribe(Box::new(move || set_version.update(|v| *v += 1)));
    version
}

impl AppContext {
    pub fn new(services: Services) -> Self {
        let tasks_version = version_signal(|bump| services.tasks.subscribe(bump));
        let notes_version = version_signal(|bump| services.notes.subscribe(bump));
        let processes_version = version_signal(|bump| services.processes.subscribe(bump));
        Self {
            tasks: StoredValue::new_local(services.tasks),
            notes: StoredValue::new_local(services.notes),
            processes: StoredValue::new_local(services.processes),
            prefs: StoredValue::new_local(services.prefs),
            tasks_version,
            notes_version,
            processes_version,
            signed_in: services.signed_in,
        }
    }

    pub fn tasks(&self) -> Rc<TaskStore> {
        self.tasks.get_value()
    }

    pub fn notes(&self) -> Rc<NoteStore> {
        self.notes.get_value()
    }

    pub fn processes(&self) -> Rc<ProcessStore> {
        self.processes.get_value()
    }

    pub fn prefs(&self) -> LayoutPreferences {
        self.prefs.get_value()
    }
}

pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}
