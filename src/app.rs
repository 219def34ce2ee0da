//! Workdesk Frontend App
//!
//! Header navigation over the tasks, notes and RPA process pages.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::components::{NavBar, NotesPage, ProcessesPage, TasksPage};
use crate::context::{use_app_context, AppContext};
use crate::services;
use crate::store::{use_app_store, AppState, AppStateStoreFields, Page};

#[component]
pub fn App() -> impl IntoView {
    match services::connect() {
        Ok(services) => {
            let state = Store::new(AppState::restore(&services.prefs));
            provide_context(state);
            provide_context(AppContext::new(services));
            view! { <Shell /> }.into_any()
        }
        Err(err) => {
            log::error!("{}", err);
            view! {
                <div class="setup-message">
                    <h1>"Workdesk"</h1>
                    <p>{err.to_string()}</p>
                    <p>"Set WORKDESK_API_URL and WORKDESK_ANON_KEY when building the frontend."</p>
                </div>
            }
            .into_any()
        }
    }
}

#[component]
fn Shell() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    view! {
        <div class="app-layout">
            <NavBar />
            <main class="main-content">
                <Show
                    when=move || ctx.signed_in
                    fallback=|| view! {
                        <p class="setup-message">"Sign in to see your workspace."</p>
                    }
                >
                    {move || match store.page().get() {
                        Page::Tasks => view! { <TasksPage /> }.into_any(),
                        Page::Notes => view! { <NotesPage /> }.into_any(),
                        Page::Processes => view! { <ProcessesPage /> }.into_any(),
                    }}
                </Show>
            </main>
        </div>
    }
}
