//! Navigation Bar Component
//!
//! Header tabs switching between the pages.

use leptos::prelude::*;

use crate::store::{use_app_store, AppStateStoreFields, Page};

#[component]
pub fn NavBar() -> impl IntoView {
    let store = use_app_store();

    view! {
        <nav class="nav-bar">
            <span class="brand">"Workdesk"</span>
            {Page::ALL
                .iter()
                .map(|page| {
                    let page = *page;
                    let tab_class = move || {
                        if store.page().get() == page { "nav-tab active" } else { "nav-tab" }
                    };
                    view! {
                        <button class=tab_class on:click=move |_| store.page().set(page)>
                            {page.title()}
                        </button>
                    }
                })
                .collect_view()}
        </nav>
    }
}
