//! Tasks Page
//!
//! Stats, filters, the new-task form and the sortable task list.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::DragEndEvent;
use workdesk_store::validation::validate_task;
use workdesk_store::{
    DragEnd, FieldErrors, Priority, ReorderController, Task, TaskDraft, TaskFilter, TaskPatch, TaskQuery,
    TaskStats, TaskStatus, ViewMode, ViewQuery,
};

use super::{
    format_date, parse_date_input, use_sortable, ConfirmDelete, DragAnnouncer, ErrorBanner, SortableItem,
    ViewToggle,
};
use crate::context::use_app_context;
use crate::services::today;
use crate::store::{use_app_store, view_mode, Page};

const TASK_STATUSES: [TaskStatus; 4] = [
    TaskStatus::NotStarted,
    TaskStatus::InProgress,
    TaskStatus::OnHold,
    TaskStatus::Completed,
];

#[component]
pub fn TasksPage() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    // initial load; served from cache on revisits
    Effect::new(move |_| {
        spawn_local(async move {
            let _ = ctx.tasks().load().await;
        });
    });

    let all_tasks = Memo::new(move |_| {
        ctx.tasks_version.get();
        ctx.tasks().items()
    });
    let visible = Memo::new(move |_| {
        ctx.tasks_version.get();
        ctx.tasks().visible(today())
    });
    let query = Memo::new(move |_| {
        ctx.tasks_version.get();
        ctx.tasks().query()
    });
    let loading = move || {
        ctx.tasks_version.get();
        ctx.tasks().is_loading()
    };
    let error = Signal::derive(move || {
        ctx.tasks_version.get();
        ctx.tasks().error()
    });
    let ids = Signal::derive(move || visible.get().iter().map(|t| t.id.clone()).collect::<Vec<_>>());
    let drag_disabled = Signal::derive(move || query.get().is_active());

    let on_drag_end = Callback::new(move |event: DragEndEvent| {
        spawn_local(async move {
            let controller = ReorderController::new(ctx.tasks());
            let _ = controller.on_drag_end(DragEnd::new(event.active_id, event.over_id), today()).await;
        });
    });
    let dnd = use_sortable(drag_disabled, on_drag_end);

    let list_class = move || match view_mode(&store, Page::Tasks) {
        ViewMode::List => "task-list",
        ViewMode::Grid => "task-grid",
    };

    view! {
        <section class="page tasks-page">
            <header class="page-header">
                <h1>"Tasks"</h1>
                <ViewToggle page=Page::Tasks />
            </header>
            <ErrorBanner error=error on_dismiss=move |_| ctx.tasks().clear_error() />
            {move || {
                let stats = TaskStats::collect(&all_tasks.get(), today());
                view! { <TaskStatsBar stats=stats /> }
            }}
            <NewTaskForm />
            <TaskFilterBar query=query />
            <Show when=move || drag_disabled.get()>
                <p class="hint">"Clear the filter and search to reorder tasks."</p>
            </Show>
            <Show when=loading>
                <p class="loading">"Loading tasks..."</p>
            </Show>
            <Show when=move || !loading() && visible.get().is_empty()>
                <p class="empty">"No tasks found."</p>
            </Show>
            <div class=list_class role="list" aria-label="Tasks">
                <For
                    each=move || visible.get()
                    key=|task| (task.id.clone(), task.updated_at, task.display_order)
                    children=move |task: Task| {
                        view! { <TaskCard task=task dnd=dnd ids=ids on_drag_end=on_drag_end /> }
                    }
                />
            </div>
            <DragAnnouncer dnd=dnd />
        </section>
    }
}

#[component]
fn TaskStatsBar(stats: TaskStats) -> impl IntoView {
    view! {
        <div class="stats-bar">
            <div class="stat"><span class="stat-value">{stats.total}</span>" total"</div>
            <div class="stat"><span class="stat-value">{stats.pending}</span>" pending"</div>
            <div class="stat"><span class="stat-value">{stats.completed}</span>" completed"</div>
            <div class="stat high"><span class="stat-value">{stats.high_priority}</span>" high priority"</div>
            <div class="stat overdue"><span class="stat-value">{stats.overdue}</span>" overdue"</div>
        </div>
    }
}

#[component]
fn TaskFilterBar(query: Memo<TaskQuery>) -> impl IntoView {
    let ctx = use_app_context();

    view! {
        <div class="filter-bar">
            <input
                type="search"
                class="search-input"
                placeholder="Search tasks..."
                prop:value=move || query.get().search
                on:input=move |ev| ctx.tasks().set_search(event_target_value(&ev))
            />
            <div class="filter-buttons">
                {TaskFilter::ALL
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
                                    ctx.tasks().set_query(TaskQuery::new(filter, search));
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

fn field_error(errors: ReadSignal<FieldErrors>, field: &'static str) -> impl IntoView {
    move || {
        errors
            .get()
            .get(field)
            .cloned()
            .map(|message| view! { <span class="field-error">{message}</span> })
    }
}

#[component]
fn NewTaskForm() -> impl IntoView {
    let ctx = use_app_context();
    let (title, set_title) = signal(String::new());
    let (priority, set_priority) = signal(Priority::Medium);
    let (status, set_status) = signal(TaskStatus::NotStarted);
    let (start_date, set_start_date) = signal(String::new());
    let (due_date, set_due_date) = signal(String::new());
    let (errors, set_errors) = signal(FieldErrors::new());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let draft = TaskDraft {
            title: title.get_untracked().trim().to_string(),
            priority: priority.get_untracked(),
            status: status.get_untracked(),
            start_date: parse_date_input(&start_date.get_untracked()),
            due_date: parse_date_input(&due_date.get_untracked()),
        };
        let found = validate_task(&draft, today());
        if !found.is_empty() {
            set_errors.set(found);
            return;
        }
        set_errors.set(FieldErrors::new());
        set_title.set(String::new());
        set_start_date.set(String::new());
        set_due_date.set(String::new());
        spawn_local(async move {
            let _ = ctx.tasks().add(draft).await;
        });
    };

    view! {
        <form class="new-item-form" on:submit=on_submit>
            <div class="form-row">
                <input
                    type="text"
                    placeholder="What needs to be done?"
                    prop:value=move || title.get()
                    on:input=move |ev| set_title.set(event_target_value(&ev))
                />
                {field_error(errors, "title")}
            </div>
            <div class="form-row">
                <select on:change=move |ev| {
                    if let Some(p) = Priority::parse(&event_target_value(&ev)) {
                        set_priority.set(p);
                    }
                }>
                    {Priority::ALL
                        .iter()
                        .map(|p| {
                            let p = *p;
                            view! {
                                <option value=p.as_str() selected=move || priority.get() == p>
                                    {p.as_str()}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
                <select on:change=move |ev| {
                    let value = event_target_value(&ev);
                    if let Some(s) = TASK_STATUSES.iter().find(|s| s.as_str() == value) {
                        set_status.set(*s);
                    }
                }>
                    {TASK_STATUSES
                        .iter()
                        .map(|s| {
                            let s = *s;
                            view! {
                                <option value=s.as_str() selected=move || status.get() == s>
                                    {s.as_str()}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
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
                {field_error(errors, "due_date")}
                <button type="submit" class="primary-btn">"Add Task"</button>
            </div>
        </form>
    }
}

#[component]
fn TaskCard(
    task: Task,
    dnd: leptos_dragdrop::DndSignals,
    ids: Signal<Vec<String>>,
    on_drag_end: Callback<DragEndEvent>,
) -> impl IntoView {
    let ctx = use_app_context();
    let id = StoredValue::new(task.id.clone());
    let (editing, set_editing) = signal(false);
    let (edit_title, set_edit_title) = signal(task.title.clone());
    let (edit_error, set_edit_error) = signal(None::<String>);
    let now = today();
    let overdue = task.is_overdue(now);
    let due_today = task.is_due_today(now);
    let priority = task.priority;

    let on_toggle = move |_| {
        if dnd.drag_just_ended_read.get_untracked() {
            return;
        }
        spawn_local(async move {
            let _ = ctx.tasks().toggle(&id.get_value()).await;
        });
    };

    let save = move || {
        let title = edit_title.get_untracked().trim().to_string();
        let check = TaskDraft::new(title.clone(), priority);
        if let Some(message) = validate_task(&check, today()).remove("title") {
            set_edit_error.set(Some(message));
            return;
        }
        set_edit_error.set(None);
        set_editing.set(false);
        let patch = TaskPatch {
            title: Some(title),
            ..TaskPatch::default()
        };
        spawn_local(async move {
            let _ = ctx.tasks().update(&id.get_value(), patch).await;
        });
    };

    let on_priority = move |ev| {
        let Some(p) = Priority::parse(&event_target_value(&ev)) else {
            return;
        };
        let patch = TaskPatch {
            priority: Some(p),
            ..TaskPatch::default()
        };
        spawn_local(async move {
            let _ = ctx.tasks().update(&id.get_value(), patch).await;
        });
    };

    let title_text = task.title.clone();
    let delete_label = task.title.clone();
    let priority_class = format!("priority-badge priority-{}", priority.as_str());

    view! {
        <SortableItem dnd=dnd id=task.id.clone() ids=ids on_drag_end=on_drag_end>
            <div class="task-card" class:completed=task.completed class:overdue=overdue>
                <input type="checkbox" prop:checked=task.completed on:change=on_toggle aria-label="Toggle completed" />
                <div class="task-body">
                    <Show
                        when=move || editing.get()
                        fallback=move || {
                            let text = title_text.clone();
                            view! {
                                <span class="task-title" on:dblclick=move |_| set_editing.set(true)>
                                    {text}
                                </span>
                            }
                        }
                    >
                        <input
                            type="text"
                            class="edit-input"
                            prop:value=move || edit_title.get()
                            on:input=move |ev| set_edit_title.set(event_target_value(&ev))
                            on:blur=move |_| save()
                            on:keydown=move |ev| match ev.key().as_str() {
                                "Enter" => save(),
                                "Escape" => set_editing.set(false),
                                _ => {}
                            }
                        />
                        {move || edit_error.get().map(|m| view! { <span class="field-error">{m}</span> })}
                    </Show>
                    <div class="task-meta">
                        <select class=priority_class on:change=on_priority aria-label="Priority">
                            {Priority::ALL
                                .iter()
                                .map(|p| view! {
                                    <option value=p.as_str() selected=*p == priority>{p.as_str()}</option>
                                })
                                .collect_view()}
                        </select>
                        <span class="status-badge">{task.status.as_str()}</span>
                        {task.start_date.map(|d| view! { <span class="date">"Starts " {format_date(d)}</span> })}
                        {task.due_date.map(|d| {
                            let label = if due_today { "Due today".to_string() } else { format!("Due {}", format_date(d)) };
                            view! { <span class="date" class:overdue=overdue>{label}</span> }
                        })}
                    </div>
                </div>
                <ConfirmDelete
                    item_label=delete_label
                    on_delete=move |_| {
                        spawn_local(async move {
                            let _ = ctx.tasks().delete(&id.get_value()).await;
                        });
                    }
                />
            </div>
        </SortableItem>
    }
}
