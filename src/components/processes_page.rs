//! RPA Processes Page
//!
//! Stats, status filters and the process list. The unfiltered grid is
//! grouped by status; every other view is a sortable list.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::{DndSignals, DragEndEvent};
use workdesk_store::validation::validate_process;
use workdesk_store::{
    group_by_status, DragEnd, FieldErrors, ProcessDraft, ProcessFilter, ProcessPatch, ProcessQuery, ProcessStats,
    ProcessStatus, ReorderController, RpaProcess, ViewQuery,
};

use super::{
    format_date, parse_date_input, use_sortable, ConfirmDelete, DragAnnouncer, ErrorBanner, SortableItem,
    ViewToggle,
};
use crate::context::use_app_context;
use crate::services::today;
use crate::store::{use_app_store, view_mode, Page};

fn status_label(status: ProcessStatus) -> &'static str {
    match status {
        ProcessStatus::Active => "Active",
        ProcessStatus::InProgress => "In Progress",
        ProcessStatus::Completed => "Completed",
        ProcessStatus::OnHold => "On Hold",
    }
}

/// Empty input means no value
fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[component]
pub fn ProcessesPage() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    Effect::new(move |_| {
        spawn_local(async move {
            let _ = ctx.processes().load().await;
        });
    });

    let all_processes = Memo::new(move |_| {
        ctx.processes_version.get();
        ctx.processes().items()
    });
    let visible = Memo::new(move |_| {
        ctx.processes_version.get();
        ctx.processes().visible(today())
    });
    let query = Memo::new(move |_| {
        ctx.processes_version.get();
        ctx.processes().query()
    });
    let loading = move || {
        ctx.processes_version.get();
        ctx.processes().is_loading()
    };
    let error = Signal::derive(move || {
        ctx.processes_version.get();
        ctx.processes().error()
    });
    let grouped = Memo::new(move |_| query.get().groups_by_status(view_mode(&store, Page::Processes)));
    let ids = Signal::derive(move || visible.get().iter().map(|p| p.id.clone()).collect::<Vec<_>>());
    let drag_disabled = Signal::derive(move || query.get().is_active() || grouped.get());

    let on_drag_end = Callback::new(move |event: DragEndEvent| {
        spawn_local(async move {
            let controller = ReorderController::new(ctx.processes());
            let _ = controller.on_drag_end(DragEnd::new(event.active_id, event.over_id), today()).await;
        });
    });
    let dnd = use_sortable(drag_disabled, on_drag_end);

    view! {
        <section class="page processes-page">
            <header class="page-header">
                <h1>"RPA Processes"</h1>
                <ViewToggle page=Page::Processes />
            </header>
            <ErrorBanner error=error on_dismiss=move |_| ctx.processes().clear_error() />
            {move || {
                let stats = ProcessStats::collect(&all_processes.get());
                view! {
                    <div class="stats-bar">
                        <div class="stat"><span class="stat-value">{stats.total}</span>" total"</div>
                        <div class="stat"><span class="stat-value">{stats.active}</span>" active"</div>
                        <div class="stat"><span class="stat-value">{stats.in_progress}</span>" in progress"</div>
                        <div class="stat"><span class="stat-value">{stats.on_hold}</span>" on hold"</div>
                        <div class="stat"><span class="stat-value">{stats.completed}</span>" completed"</div>
                    </div>
                }
            }}
            <NewProcessForm />
            <ProcessFilterBar query=query />
            <Show when=loading>
                <p class="loading">"Loading processes..."</p>
            </Show>
            <Show when=move || !loading() && visible.get().is_empty()>
                <p class="empty">"No processes found."</p>
            </Show>
            <Show
                when=move || grouped.get()
                fallback=move || {
                    view! {
                        <div class="process-list" role="list" aria-label="RPA processes">
                            <For
                                each=move || visible.get()
                                key=|p| (p.id.clone(), p.last_modified, p.display_order)
                                children=move |process: RpaProcess| {
                                    view! {
                                        <SortableItem dnd=dnd id=process.id.clone() ids=ids on_drag_end=on_drag_end>
                                            <ProcessCard process=process dnd=dnd />
                                        </SortableItem>
                                    }
                                }
                            />
                        </div>
                    }
                }
            >
                <div class="process-groups">
                    {move || {
                        group_by_status(&visible.get())
                            .into_iter()
                            .map(|(status, processes)| {
                                view! {
                                    <section class="process-group">
                                        <h2 class="group-heading">
                                            {status.heading()} " (" {processes.len()} ")"
                                        </h2>
                                        <div class="process-grid">
                                            {processes
                                                .into_iter()
                                                .map(|process| view! { <ProcessCard process=process dnd=dnd /> })
                                                .collect_view()}
                                        </div>
                                    </section>
                                }
                            })
                            .collect_view()
                    }}
                </div>
            </Show>
            <DragAnnouncer dnd=dnd />
        </section>
    }
}

#[component]
fn ProcessFilterBar(query: Memo<ProcessQuery>) -> impl IntoView {
    let ctx = use_app_context();

    view! {
        <div class="filter-bar">
            <input
                type="search"
                class="search-input"
                placeholder="Search processes..."
                prop:value=move || query.get().search
                on:input=move |ev| ctx.processes().set_search(event_target_value(&ev))
            />
            <div class="filter-buttons">
                {ProcessFilter::ALL
                    .iter()
                    .map(|filter| {
                        let filter = *filter;
                        view! {
                            <button
                                class=move || {
                                    if query.get().filter == filter { "filter-btn active" } else { "filter-btn" }
                                }
                                on:click=move |_| {
                                    let search = query.get_untracked().search;
                                    ctx.processes().set_query(ProcessQuery { filter, search });
                                }
                            >
                                {filter.label()}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}

#[component]
fn NewProcessForm() -> impl IntoView {
    let ctx = use_app_context();
    let (open, set_open) = signal(false);
    let (name, set_name) = signal(String::new());
    let (description, set_description) = signal(String::new());
    let (status, set_status) = signal(ProcessStatus::Active);
    let (owner, set_owner) = signal(String::new());
    let (department, set_department) = signal(String::new());
    let (entity_name, set_entity_name) = signal(String::new());
    let (start_date, set_start_date) = signal(String::new());
    let (due_date, set_due_date) = signal(String::new());
    let (errors, set_errors) = signal(FieldErrors::new());

    let reset = move || {
        for setter in [set_name, set_description, set_owner, set_department, set_entity_name, set_start_date, set_due_date] {
            setter.set(String::new());
        }
        set_status.set(ProcessStatus::Active);
        set_errors.set(FieldErrors::new());
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let draft = ProcessDraft {
            name: name.get_untracked().trim().to_string(),
            description: description.get_untracked().trim().to_string(),
            status: status.get_untracked(),
            owner: optional(owner.get_untracked()),
            department: optional(department.get_untracked()),
            entity_name: optional(entity_name.get_untracked()),
            start_date: parse_date_input(&start_date.get_untracked()),
            due_date: parse_date_input(&due_date.get_untracked()),
        };
        let found = validate_process(&draft);
        if !found.is_empty() {
            set_errors.set(found);
            return;
        }
        reset();
        set_open.set(false);
        spawn_local(async move {
            let _ = ctx.processes().add(draft).await;
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

    let text_input = move |placeholder: &'static str, value: ReadSignal<String>, set: WriteSignal<String>| {
        view! {
            <input
                type="text"
                placeholder=placeholder
                prop:value=move || value.get()
                on:input=move |ev| set.set(event_target_value(&ev))
            />
        }
    };

    view! {
        <Show
            when=move || open.get()
            fallback=move || view! {
                <button class="primary-btn" on:click=move |_| set_open.set(true)>"New Process"</button>
            }
        >
            <form class="new-item-form process-form" on:submit=on_submit>
                {text_input("Process name", name, set_name)}
                {error_for("name")}
                <textarea
                    placeholder="Description"
                    prop:value=move || description.get()
                    on:input=move |ev| set_description.set(event_target_value(&ev))
                ></textarea>
                {error_for("description")}
                <select on:change=move |ev| {
                    if let Some(s) = ProcessStatus::parse(&event_target_value(&ev)) {
                        set_status.set(s);
                    }
                }>
                    {ProcessStatus::GROUP_ORDER
                        .iter()
                        .map(|s| {
                            let s = *s;
                            view! {
                                <option value=s.as_str() selected=move || status.get() == s>{status_label(s)}</option>
                            }
                        })
                        .collect_view()}
                </select>
                {text_input("Owner", owner, set_owner)}
                {error_for("owner")}
                {text_input("Department", department, set_department)}
                {error_for("department")}
                {text_input("Entity", entity_name, set_entity_name)}
                {error_for("entity_name")}
                <label>
                    "Start"
                    <input
                        type="date"
                        prop:value=move || start_date.get()
                        on:input=move |ev| set_start_date.set(event_target_value(&ev))
                    />
                </label>
                <label>
                    "Due"
                    <input
                        type="date"
                        prop:value=move || due_date.get()
                        on:input=move |ev| set_due_date.set(event_target_value(&ev))
                    />
                </label>
                {error_for("due_date")}
                <div class="form-actions">
                    <button type="submit" class="primary-btn">"Create"</button>
                    <button
                        type="button"
                        class="cancel-btn"
                        on:click=move |_| {
                            reset();
                            set_open.set(false);
                        }
                    >
                        "Cancel"
                    </button>
                </div>
            </form>
        </Show>
    }
}

#[component]
fn ProcessCard(process: RpaProcess, dnd: DndSignals) -> impl IntoView {
    let ctx = use_app_context();
    let id = StoredValue::new(process.id.clone());
    let current = process.status;
    let delete_label = process.name.clone();

    let on_status = move |ev| {
        if dnd.drag_just_ended_read.get_untracked() {
            return;
        }
        let Some(status) = ProcessStatus::parse(&event_target_value(&ev)) else {
            return;
        };
        let patch = ProcessPatch {
            status: Some(status),
            ..ProcessPatch::default()
        };
        spawn_local(async move {
            let _ = ctx.processes().update(&id.get_value(), patch).await;
        });
    };

    let details = [
        ("Owner", process.owner.clone()),
        ("Department", process.department.clone()),
        ("Entity", process.entity_name.clone()),
        ("Start", process.start_date.map(format_date)),
        ("Due", process.due_date.map(format_date)),
    ];

    view! {
        <article class=format!("process-card status-{}", current.as_str())>
            <header class="process-card-header">
                <h3 class="process-name">{process.name.clone()}</h3>
                <select class="status-select" on:change=on_status aria-label="Status">
                    {ProcessStatus::GROUP_ORDER
                        .iter()
                        .map(|s| view! {
                            <option value=s.as_str() selected=*s == current>{status_label(*s)}</option>
                        })
                        .collect_view()}
                </select>
            </header>
            <p class="process-description">{process.description.clone()}</p>
            <dl class="process-details">
                {details
                    .into_iter()
                    .filter_map(|(label, value)| value.map(|v| view! { <dt>{label}</dt><dd>{v}</dd> }))
                    .collect_view()}
            </dl>
            <ConfirmDelete
                item_label=delete_label
                on_delete=move |_| {
                    spawn_local(async move {
                        let _ = ctx.processes().delete(&id.get_value()).await;
                    });
                }
            />
        </article>
    }
}
