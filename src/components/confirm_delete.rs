//! Confirm Delete
//!
//! Two-step delete for cards. The trash button arms a prompt naming the item;
//! Escape, "Keep" or a few idle seconds disarm it again.

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use web_sys::{KeyboardEvent, MouseEvent};

const LABEL_LIMIT: usize = 32;
const DISARM_AFTER_MS: u32 = 4_000;

/// Prompt naming the item, shortened to fit a card
pub(crate) fn delete_prompt(label: &str) -> String {
    let label = label.trim();
    if label.is_empty() {
        return "Delete this item?".to_string();
    }
    if label.chars().count() <= LABEL_LIMIT {
        return format!("Delete \"{}\"?", label);
    }
    let short: String = label.chars().take(LABEL_LIMIT - 1).collect();
    format!("Delete \"{}…\"?", short.trim_end())
}

#[component]
pub fn ConfirmDelete(
    /// Title or name of the item, shown in the prompt
    #[prop(into)]
    item_label: String,
    #[prop(into)] on_delete: Callback<()>,
) -> impl IntoView {
    let armed = RwSignal::new(false);
    // bumped on every arm so a stale timeout leaves a newer prompt alone
    let ticket = RwSignal::new(0u32);
    let confirm_ref = NodeRef::<leptos::html::Button>::new();
    let prompt = delete_prompt(&item_label);
    let trash_label = format!("Delete {}", item_label.trim());

    let arm = move |ev: MouseEvent| {
        ev.stop_propagation();
        let current = ticket.get_untracked() + 1;
        ticket.set(current);
        armed.set(true);
        Timeout::new(DISARM_AFTER_MS, move || {
            if ticket.try_get_untracked() == Some(current) {
                armed.try_set(false);
            }
        })
        .forget();
    };

    let on_keydown = move |ev: KeyboardEvent| {
        if ev.key() == "Escape" {
            ev.stop_propagation();
            armed.set(false);
        }
    };

    Effect::new(move |_| {
        if armed.get() {
            if let Some(button) = confirm_ref.get() {
                let _ = button.focus();
            }
        }
    });

    view! {
        <Show
            when=move || armed.get()
            fallback=move || view! {
                <button class="delete-btn" title=trash_label.clone() aria-label=trash_label.clone() on:click=arm>
                    "🗑"
                </button>
            }
        >
            <span class="delete-confirm" role="alertdialog" on:keydown=on_keydown>
                <span class="delete-confirm-text">{prompt.clone()}</span>
                <button
                    class="confirm-btn danger"
                    node_ref=confirm_ref
                    on:click=move |ev| {
                        ev.stop_propagation();
                        armed.set(false);
                        on_delete.run(());
                    }
                >
                    "Delete"
                </button>
                <button
                    class="cancel-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        armed.set(false);
                    }
                >
                    "Keep"
                </button>
            </span>
        </Show>
    }
}
