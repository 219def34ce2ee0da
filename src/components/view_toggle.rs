//! View Toggle Component
//!
//! List/grid switch for one page; the choice is remembered.

use leptos::prelude::*;
use workdesk_store::ViewMode;

use crate::context::use_app_context;
use crate::store::{set_view_mode, use_app_store, view_mode, Page};

#[component]
pub fn ViewToggle(page: Page) -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let button = move |mode: ViewMode, label: &'static str| {
        view! {
            <button
                class=move || if view_mode(&store, page) == mode { "view-btn active" } else { "view-btn" }
                aria-label=format!("{} view", label)
                on:click=move |_| set_view_mode(&store, &ctx.prefs(), page, mode)
            >
                {label}
            </button>
        }
    };

    view! {
        <div class="view-toggle">
            <span class="view-toggle-label">"View:"</span>
            {button(ViewMode::List, "List")}
            {button(ViewMode::Grid, "Grid")}
        </div>
    }
}
