//! UI Components
//!
//! Pages and the pieces they share.

mod confirm_delete;
mod error_banner;
mod nav_bar;
mod notes_page;
mod processes_page;
mod sortable;
mod tasks_page;
mod view_toggle;

pub use confirm_delete::ConfirmDelete;
pub use error_banner::ErrorBanner;
pub use nav_bar::NavBar;
pub use notes_page::NotesPage;
pub use processes_page::ProcessesPage;
pub use sortable::{use_sortable, DragAnnouncer, SortableItem};
pub use tasks_page::TasksPage;
pub use view_toggle::ViewToggle;

use chrono::NaiveDate;

/// Value of an `<input type="date">`, empty meaning none
pub(crate) fn parse_date_input(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}
