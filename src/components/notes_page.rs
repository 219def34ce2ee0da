//! Notes Page

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::{DndSignals, DragEndEvent};
use workdesk_store::validation::validate_note;
use workdesk_store::{DragEnd, FieldErrors, Note, NoteDraft, NotePatch, ReorderController, ViewMode, ViewQuery};

use super::{use_sortable, ConfirmDelete, DragAnnouncer, ErrorBanner, SortableItem, ViewToggle};
use crate::context::use_app_context;
use crate::services::today;
use crate::store::{use_app_store, view_mode, Page};

#[component]
pub fn NotesPage() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    Effect::new(move |_| {
        spawn_local(async move {
            let _ = ctx.notes().load().await;
        });
    });

    let visible = Memo::new(move |_| {
        ctx.notes_version.get();
        ctx.notes().visible(today())
    });
    let search = Memo::new(move |_| {
        ctx.notes_version.get();
        ctx.notes().query().search
    });
    let loading = move || {
        ctx.notes_version.get();
        ctx.notes().is_loading()
    };
    let error = Signal::derive(move || {
        ctx.notes_version.get();
        ctx.notes().error()
    });
    let ids = Signal::derive(move || visible.get().iter().map(|n| n.id.clone()).collect::<Vec<_>>());
    let drag_disabled = Signal::derive(move || {
        ctx.notes_version.get();
        ctx.notes().query().is_active()
    });

    let on_drag_end = Callback::new(move |event: DragEndEvent| {
        spawn_local(async move {
            let controller = ReorderController::new(ctx.notes());
            let _ = controller.on_drag_end(DragEnd::new(event.active_id, event.over_id), today()).await;
        });
    });
    let dnd = use_sortable(drag_disabled, on_drag_end);

    let list_class = move || match view_mode(&store, Page::Notes) {
        ViewMode::List => "note-list",
        ViewMode::Grid => "note-grid",
    };

    view! {
        <section class="page notes-page">
            <header class="page-header">
                <h1>"Notes"</h1>
                <ViewToggle page=Page::Notes />
            </header>
            <ErrorBanner error=error on_dismiss=move |_| ctx.notes().clear_error() />
            <NewNoteForm />
            <div class="filter-bar">
                <input
                    type="search"
                    class="search-input"
                    placeholder="Search notes..."
                    prop:value=move || search.get()
                    on:input=move |ev| ctx.notes().set_search(event_target_value(&ev))
                />
            </div>
            <Show when=loading>
                <p class="loading">"Loading notes..."</p>
            </Show>
            <Show when=move || !loading() && visible.get().is_empty()>
                <p class="empty">"No notes yet."</p>
            </Show>
            <div class=list_class role="list" aria-label="Notes">
                <For
                    each=move || visible.get()
                    key=|note| (note.id.clone(), note.last_edited, note.display_order)
                    children=move |note: Note| {
                        view! { <NoteCard note=note dnd=dnd ids=ids on_drag_end=on_drag_end /> }
                    }
                />
            </div>
            <DragAnnouncer dnd=dnd />
        </section>
    }
}

#[component]
fn NewNoteForm() -> impl IntoView {
    let ctx = use_app_context();
    let (title, set_title) = signal(String::new());
    let (content, set_content) = signal(String::new());
    let (errors, set_errors) = signal(FieldErrors::new());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let draft = NoteDraft::new(title.get_untracked().trim(), content.get_untracked().trim());
        let found = validate_note(&draft);
        if !found.is_empty() {
            set_errors.set(found);
            return;
        }
        set_errors.set(FieldErrors::new());
        set_title.set(String::new());
        set_content.set(String::new());
        spawn_local(async move {
            let _ = ctx.notes().add(draft).await;
        });
    };

    let error_for = move |field: &'static str| {
        move || {
            errors
                .get()
                .get(field)
                .cloned()
                .map(|message| view! { <span class="field-error">{message}</span> })
        }
    };

    view! {
        <form class="new-item-form" on:submit=on_submit>
            <input
                type="text"
                placeholder="Note title"
                prop:value=move || title.get()
                on:input=move |ev| set_title.set(event_target_value(&ev))
            />
            {error_for("title")}
            <textarea
                placeholder="Write something..."
                prop:value=move || content.get()
                on:input=move |ev| set_content.set(event_target_value(&ev))
            ></textarea>
            {error_for("content")}
            <button type="submit" class="primary-btn">"Add Note"</button>
        </form>
    }
}

#[component]
fn NoteCard(
    note: Note,
    dnd: DndSignals,
    ids: Signal<Vec<String>>,
    on_drag_end: Callback<DragEndEvent>,
) -> impl IntoView {
    let ctx = use_app_context();
    let id = StoredValue::new(note.id.clone());
    let (editing, set_editing) = signal(false);
    let (edit_title, set_edit_title) = signal(note.title.clone());
    let (edit_content, set_edit_content) = signal(note.content.clone());
    let (errors, set_errors) = signal(FieldErrors::new());

    let save = move |_| {
        let title = edit_title.get_untracked().trim().to_string();
        let content = edit_content.get_untracked().trim().to_string();
        let found = validate_note(&NoteDraft::new(title.clone(), content.clone()));
        if !found.is_empty() {
            set_errors.set(found);
            return;
        }
        set_errors.set(FieldErrors::new());
        set_editing.set(false);
        let patch = NotePatch {
            title: Some(title),
            content: Some(content),
        };
        spawn_local(async move {
            let _ = ctx.notes().update(&id.get_value(), patch).await;
        });
    };

    let title = note.title.clone();
    let delete_label = note.title.clone();
    let content = note.content.clone();
    let edited = note.last_edited.format("%b %d, %Y %H:%M").to_string();

    view! {
        <SortableItem dnd=dnd id=note.id.clone() ids=ids on_drag_end=on_drag_end>
            <article class="note-card">
                <Show
                    when=move || editing.get()
                    fallback=move || {
                        let title = title.clone();
                        let content = content.clone();
                        view! {
                            <h3 class="note-title">{title}</h3>
                            <p class="note-content">{content}</p>
                            <button class="edit-btn" on:click=move |_| set_editing.set(true)>"Edit"</button>
                        }
                    }
                >
                    <input
                        type="text"
                        prop:value=move || edit_title.get()
                        on:input=move |ev| set_edit_title.set(event_target_value(&ev))
                    />
                    <textarea
                        prop:value=move || edit_content.get()
                        on:input=move |ev| set_edit_content.set(event_target_value(&ev))
                    ></textarea>
                    {move || {
                        errors
                            .get()
                            .into_values()
                            .map(|message| view! { <span class="field-error">{message}</span> })
                            .collect_view()
                    }}
                    <button class="primary-btn" on:click=save>"Save"</button>
                    <button class="cancel-btn" on:click=move |_| set_editing.set(false)>"Cancel"</button>
                </Show>
                <footer class="note-footer">
                    <span class="note-edited">"Edited " {edited}</span>
                    <ConfirmDelete
                        item_label=delete_label
                        on_delete=move |_| {
                            spawn_local(async move {
                                let _ = ctx.notes().delete(&id.get_value()).await;
                            });
                        }
                    />
                </footer>
            </article>
        </SortableItem>
    }
}
