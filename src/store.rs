//! UI State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity over the
//! navigation and per-page layout state.

use leptos::prelude::*;
use reactive_stores::Store;
use workdesk_store::{LayoutPage, LayoutPreferences, ViewMode};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Tasks,
    Notes,
    Processes,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Tasks, Page::Notes, Page::Processes];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Tasks => "Tasks",
            Page::Notes => "Notes",
            Page::Processes => "RPA Processes",
        }
    }

    pub fn layout(&self) -> LayoutPage {
        match self {
            Page::Tasks => LayoutPage::Tasks,
            Page::Notes => LayoutPage::Notes,
            Page::Processes => LayoutPage::Processes,
        }
    }
}

/// UI state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Page shown in the main area
    pub page: Page,
    pub tasks_view: ViewMode,
    pub notes_view: ViewMode,
    pub processes_view: ViewMode,
}

impl AppState {
    /// Start on the tasks page with remembered layouts
    pub fn restore(prefs: &LayoutPreferences) -> Self {
        Self {
            page: Page::Tasks,
            tasks_view: prefs.load(LayoutPage::Tasks),
            notes_view: prefs.load(LayoutPage::Notes),
            processes_view: prefs.load(LayoutPage::Processes),
        }
    }
}

pub type AppStore = Store<AppState>;

pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

/// Current layout of `page`
pub fn view_mode(store: &AppStore, page: Page) -> ViewMode {
    match page {
        Page::Tasks => store.tasks_view().get(),
        Page::Notes => store.notes_view().get(),
        Page::Processes => store.processes_view().get(),
    }
}

/// Switch the layout of `page` and remember it
pub fn set_view_mode(store: &AppStore, prefs: &LayoutPreferences, page: Page, mode: ViewMode) {
    match page {
        Page::Tasks => store.tasks_view().set(mode),
        Page::Notes => store.notes_view().set(mode),
        Page::Processes => store.processes_view().set(mode),
    }
    prefs.save(page.layout(), mode);
}
