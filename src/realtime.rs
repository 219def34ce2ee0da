//! Realtime Task Feed
//!
//! Opens the backend's realtime socket and folds task changes made in other
//! sessions into the task store.

use std::rc::Rc;

use gloo_timers::callback::Interval;
use leptos::task::spawn_local;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{MessageEvent, WebSocket};
use workdesk_store::{RealtimeChannel, Resource, StoreConfig, Task, TaskStore};

const HEARTBEAT_MS: u32 = 30_000;

/// Subscribe `tasks` to remote changes of `owner`'s rows
pub fn subscribe_tasks(
    config: &StoreConfig,
    owner: &str,
    access_token: Option<String>,
    tasks: Rc<TaskStore>,
) -> Result<(), JsValue> {
    let channel = RealtimeChannel::new(Task::TABLE, owner);
    let socket = WebSocket::new(&RealtimeChannel::socket_url(&config.api_url, &config.anon_key))?;

    let join = channel.join_message(access_token.as_deref()).to_string();
    let sender = socket.clone();
    let on_open = Closure::<dyn FnMut()>::new(move || {
        log::info!("realtime socket open");
        if let Err(e) = sender.send_with_str(&join) {
            log::warn!("realtime join failed: {:?}", e);
        }
    });
    socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
    on_open.forget();

    let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |ev: MessageEvent| {
        let Some(frame) = ev.data().as_string() else {
            return;
        };
        let Some(change) = channel.parse(&frame) else {
            return;
        };
        let tasks = tasks.clone();
        spawn_local(async move {
            if let Err(e) = tasks.apply_remote_change(change).await {
                log::warn!("remote task change not applied: {}", e);
            }
        });
    });
    socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    on_message.forget();

    let on_close = Closure::<dyn FnMut()>::new(|| log::warn!("realtime socket closed"));
    socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));
    on_close.forget();

    let mut message_ref = 1u64;
    Interval::new(HEARTBEAT_MS, move || {
        if socket.ready_state() != WebSocket::OPEN {
            return;
        }
        message_ref += 1;
        let beat = RealtimeChannel::heartbeat(message_ref).to_string();
        if let Err(e) = socket.send_with_str(&beat) {
            log::warn!("realtime heartbeat failed: {:?}", e);
        }
    })
    .forget();

    Ok(())
}
