//! Leptos Sortable Utilities
//!
//! Drag-and-drop reordering of lists and grids for Leptos.
//! Pointer sensor: a press becomes a drag only after moving past a small
//! distance, so plain clicks still reach the item. Keyboard sensor and
//! announcements live in their own modules.

pub mod announce;
pub mod keyboard;

use leptos::prelude::*;
use wasm_bindgen::JsCast;

pub use keyboard::{KeyOutcome, KeyboardDrag};

/// Movement in pixels before a press turns into a drag
pub const DRAG_THRESHOLD_PX: i32 = 5;

/// A finished drag: what was dragged and what it was released over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEndEvent {
    pub active_id: String,
    pub over_id: Option<String>,
}

/// Whether the pointer has moved far enough from `start` to start a drag
pub fn exceeds_threshold(start: (i32, i32), current: (i32, i32)) -> bool {
    let dx = current.0 - start.0;
    let dy = current.1 - start.1;
    dx * dx + dy * dy > DRAG_THRESHOLD_PX * DRAG_THRESHOLD_PX
}

/// DnD state signals for one sortable container
#[derive(Clone, Copy)]
pub struct DndSignals {
    pub active_id_read: ReadSignal<Option<String>>,
    pub active_id_write: WriteSignal<Option<String>>,
    pub over_id_read: ReadSignal<Option<String>>,
    pub over_id_write: WriteSignal<Option<String>>,
    pub drag_just_ended_read: ReadSignal<bool>,
    pub drag_just_ended_write: WriteSignal<bool>,
    /// Pressed item (pointerdown but not yet dragging)
    pub pending_id_read: ReadSignal<Option<String>>,
    pub pending_id_write: WriteSignal<Option<String>>,
    /// Press position for movement detection
    pub start_read: ReadSignal<(i32, i32)>,
    pub start_write: WriteSignal<(i32, i32)>,
    /// Keyboard pick-up in progress
    pub keyboard_read: ReadSignal<Option<KeyboardDrag>>,
    pub keyboard_write: WriteSignal<Option<KeyboardDrag>>,
    /// Live-region text for screen readers
    pub announcement_read: ReadSignal<String>,
    pub announcement_write: WriteSignal<String>,
    pub disabled: Signal<bool>,
}

pub fn create_dnd_signals(disabled: Signal<bool>) -> DndSignals {
    let (active_id_read, active_id_write) = signal(None::<String>);
    let (over_id_read, over_id_write) = signal(None::<String>);
    let (drag_just_ended_read, drag_just_ended_write) = signal(false);
    let (pending_id_read, pending_id_write) = signal(None::<String>);
    let (start_read, start_write) = signal((0i32, 0i32));
    let (keyboard_read, keyboard_write) = signal(None::<KeyboardDrag>);
    let (announcement_read, announcement_write) = signal(String::new());
    DndSignals {
        active_id_read,
        active_id_write,
        over_id_read,
        over_id_write,
        drag_just_ended_read,
        drag_just_ended_write,
        pending_id_read,
        pending_id_write,
        start_read,
        start_write,
        keyboard_read,
        keyboard_write,
        announcement_read,
        announcement_write,
        disabled,
    }
}

impl DndSignals {
    /// Item currently lifted by pointer or keyboard
    pub fn is_active(&self, item_id: &str) -> bool {
        self.active_id_read.with(|id| id.as_deref() == Some(item_id))
    }

    pub fn is_over(&self, item_id: &str) -> bool {
        self.over_id_read.with(|id| id.as_deref() == Some(item_id))
    }

    /// The owning view is gone; document listeners outlive it
    pub fn is_disposed(&self) -> bool {
        self.active_id_read.is_disposed()
    }
}

/// End drag operation
pub fn end_drag(dnd: &DndSignals) {
    dnd.active_id_write.set(None);
    dnd.over_id_write.set(None);
    dnd.pending_id_write.set(None);
    dnd.keyboard_write.set(None);
    dnd.drag_just_ended_write.set(true);

    // swallow the click that follows a pointer drop
    if let Some(win) = web_sys::window() {
        let clear = dnd.drag_just_ended_write;
        let cb = wasm_bindgen::closure::Closure::<dyn FnMut()>::new(move || {
            clear.set(false);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 100);
        cb.forget();
    }
}

fn is_form_control(ev: &web_sys::PointerEvent) -> bool {
    ev.target().is_some_and(|target| {
        target.dyn_ref::<web_sys::HtmlInputElement>().is_some()
            || target.dyn_ref::<web_sys::HtmlButtonElement>().is_some()
            || target.dyn_ref::<web_sys::HtmlTextAreaElement>().is_some()
            || target.dyn_ref::<web_sys::HtmlSelectElement>().is_some()
    })
}

/// Pointerdown handler for sortable items: records a pending drag
pub fn make_on_pointerdown(dnd: DndSignals, item_id: String) -> impl Fn(web_sys::PointerEvent) + Clone + 'static {
    move |ev: web_sys::PointerEvent| {
        if ev.button() != 0 || dnd.disabled.get_untracked() || is_form_control(&ev) {
            return;
        }
        dnd.pending_id_write.set(Some(item_id.clone()));
        dnd.start_write.set((ev.client_x(), ev.client_y()));
    }
}

/// Document pointermove: starts the drag once the press has moved enough
pub fn bind_global_pointermove(dnd: DndSignals) {
    use wasm_bindgen::closure::Closure;

    let on_pointermove = Closure::<dyn FnMut(web_sys::PointerEvent)>::new(move |ev: web_sys::PointerEvent| {
        if dnd.is_disposed() {
            return;
        }
        let Some(pending) = dnd.pending_id_read.get_untracked() else {
            return;
        };
        if dnd.active_id_read.get_untracked().is_some() {
            return;
        }
        if exceeds_threshold(dnd.start_read.get_untracked(), (ev.client_x(), ev.client_y())) {
            dnd.announcement_write.set(announce::picked_up(&pending));
            dnd.active_id_write.set(Some(pending));
        }
    });

    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            let _ = doc.add_event_listener_with_callback("pointermove", on_pointermove.as_ref().unchecked_ref());
        }
    }
    on_pointermove.forget();
}

/// Pointerenter handler for sortable items: becomes the drop target
pub fn make_on_pointerenter(dnd: DndSignals, item_id: String) -> impl Fn(web_sys::PointerEvent) + Clone + 'static {
    move |_ev: web_sys::PointerEvent| {
        let Some(active) = dnd.active_id_read.get_untracked() else {
            return;
        };
        if dnd.over_id_read.get_untracked().as_deref() != Some(item_id.as_str()) {
            dnd.announcement_write.set(announce::over(&active, Some(&item_id)));
            dnd.over_id_write.set(Some(item_id.clone()));
        }
    }
}

/// Document pointerup: reports the drop when a drag was active
pub fn bind_global_pointerup<F>(dnd: DndSignals, on_drag_end: F)
where
    F: Fn(DragEndEvent) + Clone + 'static,
{
    use wasm_bindgen::closure::Closure;

    let on_pointerup = Closure::<dyn FnMut(web_sys::PointerEvent)>::new(move |_ev: web_sys::PointerEvent| {
        if dnd.is_disposed() {
            return;
        }
        let active = dnd.active_id_read.get_untracked();
        let over = dnd.over_id_read.get_untracked();
        dnd.pending_id_write.set(None);

        match active {
            Some(active_id) => {
                dnd.announcement_write.set(announce::dropped(&active_id, over.as_deref()));
                end_drag(&dnd);
                on_drag_end(DragEndEvent { active_id, over_id: over });
            }
            // a click; it reaches the element as usual
            None => dnd.pending_id_write.set(None),
        }
    });

    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            let _ = doc.add_event_listener_with_callback("pointerup", on_pointerup.as_ref().unchecked_ref());
        }
    }
    on_pointerup.forget();

    bind_global_pointermove(dnd);
}

/// Keydown handler for focusable sortable items
pub fn make_on_keydown<F>(
    dnd: DndSignals,
    item_id: String,
    ids: Signal<Vec<String>>,
    on_drag_end: F,
) -> impl Fn(web_sys::KeyboardEvent) + Clone + 'static
where
    F: Fn(DragEndEvent) + Clone + 'static,
{
    move |ev: web_sys::KeyboardEvent| {
        // keys typed into controls inside the item are not drag commands
        if dnd.disabled.get_untracked() || ev.target() != ev.current_target() {
            return;
        }
        let mut state = dnd.keyboard_read.get_untracked();
        let outcome = ids.with_untracked(|ids| keyboard::on_key(&mut state, &item_id, &ev.key(), ids));
        if !outcome.handled() {
            return;
        }
        ev.prevent_default();
        dnd.keyboard_write.set(state);

        match outcome {
            KeyOutcome::PickedUp { active_id } => {
                dnd.announcement_write.set(announce::picked_up(&active_id));
                dnd.over_id_write.set(Some(active_id.clone()));
                dnd.active_id_write.set(Some(active_id));
            }
            KeyOutcome::Moved { active_id, over_id } => {
                dnd.announcement_write.set(announce::over(&active_id, Some(&over_id)));
                dnd.over_id_write.set(Some(over_id));
            }
            KeyOutcome::Dropped(event) => {
                dnd.announcement_write.set(announce::dropped(&event.active_id, event.over_id.as_deref()));
                end_drag(&dnd);
                on_drag_end(event);
            }
            KeyOutcome::Cancelled { active_id } => {
                dnd.announcement_write.set(announce::cancelled(&active_id));
                end_drag(&dnd);
            }
            KeyOutcome::Ignored => {}
        }
    }
}
