//! Realtime Changes
//!
//! Row changes pushed by the backend's realtime socket (Phoenix channel
//! protocol). This module only builds and reads the JSON frames; the socket
//! itself belongs to the runtime (a browser WebSocket in the frontend).

use serde_json::{json, Value};

/// One row change made by any session of the signed-in user
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteChange {
    Inserted(Value),
    Updated(Value),
    Deleted { id: String },
}

/// Row id as a string (tables may use text or numeric keys)
pub fn row_id(row: &Value) -> Option<String> {
    match &row["id"] {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Subscription to every change on one table, limited to one owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeChannel {
    table: String,
    owner: String,
}

impl RealtimeChannel {
    pub fn new(table: &str, owner: &str) -> Self {
        Self {
            table: table.to_string(),
            owner: owner.to_string(),
        }
    }

    /// WebSocket URL for the project at `api_url`
    pub fn socket_url(api_url: &str, anon_key: &str) -> String {
        let base = api_url.trim_end_matches('/');
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };
        format!("{}/realtime/v1/websocket?apikey={}&vsn=1.0.0", base, anon_key)
    }

    pub fn topic(&self) -> String {
        format!("realtime:{}_channel", self.table)
    }

    /// First frame after the socket opens
    pub fn join_message(&self, access_token: Option<&str>) -> Value {
        let mut payload = json!({
            "config": {
                "postgres_changes": [{
                    "event": "*",
                    "schema": "public",
                    "table": self.table,
                    "filter": format!("user_id=eq.{}", self.owner),
                }]
            }
        });
        if let Some(token) = access_token {
            payload["access_token"] = json!(token);
        }
        json!({
            "topic": self.topic(),
            "event": "phx_join",
            "payload": payload,
            "ref": "1",
        })
    }

    /// Keep-alive frame; the server drops sockets that stay silent
    pub fn heartbeat(message_ref: u64) -> Value {
        json!({
            "topic": "phoenix",
            "event": "heartbeat",
            "payload": {},
            "ref": message_ref.to_string(),
        })
    }

    /// The row change carried by `frame`, if it is one for this channel
    pub fn parse(&self, frame: &str) -> Option<RemoteChange> {
        let message: Value = serde_json::from_str(frame).ok()?;
        if message["event"] != "postgres_changes" || message["topic"] != self.topic().as_str() {
            return None;
        }
        let data = &message["payload"]["data"];
        if data["table"] != self.table.as_str() {
            return None;
        }
        match data["type"].as_str()? {
            "INSERT" => Some(RemoteChange::Inserted(data["record"].clone())),
            "UPDATE" => Some(RemoteChange::Updated(data["record"].clone())),
            "DELETE" => row_id(&data["old_record"]).map(|id| RemoteChange::Deleted { id }),
            other => {
                log::debug!("ignoring realtime event {}", other);
                None
            }
        }
    }
}
