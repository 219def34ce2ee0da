//! Sortable Items
//!
//! Glue between the drag-and-drop signals and the page lists.

use leptos::prelude::*;
use leptos_dragdrop::{
    bind_global_pointerup, create_dnd_signals, make_on_keydown, make_on_pointerdown, make_on_pointerenter,
    DndSignals, DragEndEvent,
};

/// Signals for one sortable list, with the document-level handlers bound
pub fn use_sortable(disabled: Signal<bool>, on_drag_end: Callback<DragEndEvent>) -> DndSignals {
    let dnd = create_dnd_signals(disabled);
    bind_global_pointerup(dnd, move |event| on_drag_end.run(event));
    dnd
}

#[component]
pub fn SortableItem(
    dnd: DndSignals,
    #[prop(into)] id: String,
    ids: Signal<Vec<String>>,
    on_drag_end: Callback<DragEndEvent>,
    children: Children,
) -> impl IntoView {
    let on_pointerdown = make_on_pointerdown(dnd, id.clone());
    let on_pointerenter = make_on_pointerenter(dnd, id.clone());
    let on_keydown = make_on_keydown(dnd, id.clone(), ids, move |event| on_drag_end.run(event));
    let active_id = id.clone();
    let over_id = id;

    view! {
        <div
            class="sortable-item"
            role="listitem"
            tabindex=move || if dnd.disabled.get() { "-1" } else { "0" }
            aria-roledescription="sortable"
            class:dragging=move || dnd.is_active(&active_id)
            class:drop-target=move || dnd.is_over(&over_id)
            class:sortable-disabled=move || dnd.disabled.get()
            on:pointerdown=on_pointerdown
            on:pointerenter=on_pointerenter
            on:keydown=on_keydown
        >
            {children()}
        </div>
    }
}

/// Live region reading out drag progress
#[component]
pub fn DragAnnouncer(dnd: DndSignals) -> impl IntoView {
    view! {
        <div class="sr-only" aria-live="assertive" aria-atomic="true">
            {move || dnd.announcement_read.get()}
        </div>
    }
}
