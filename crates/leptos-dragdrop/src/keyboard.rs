//! Keyboard Sensor
//!
//! Space/Enter picks up the focused item, arrows move the drop target,
//! Space/Enter drops, Escape cancels.

use crate::DragEndEvent;

/// An item lifted with the keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardDrag {
    pub active_id: String,
    pub over_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not a sorting key (or nothing to do); let the event through
    Ignored,
    PickedUp { active_id: String },
    Moved { active_id: String, over_id: String },
    Dropped(DragEndEvent),
    Cancelled { active_id: String },
}

impl KeyOutcome {
    /// Whether the key was consumed and its default action should stop
    pub fn handled(&self) -> bool {
        !matches!(self, KeyOutcome::Ignored)
    }
}

fn step(ids: &[String], current: &str, forward: bool) -> Option<String> {
    let index = ids.iter().position(|id| id == current)?;
    let next = if forward {
        (index + 1).min(ids.len().saturating_sub(1))
    } else {
        index.saturating_sub(1)
    };
    ids.get(next).cloned()
}

/// Advance the keyboard drag for `key` pressed on `focused_id`.
/// `ids` is the sortable list in rendered order.
pub fn on_key(state: &mut Option<KeyboardDrag>, focused_id: &str, key: &str, ids: &[String]) -> KeyOutcome {
    let Some(drag) = state.as_mut() else {
        if !matches!(key, " " | "Enter") {
            return KeyOutcome::Ignored;
        }
        *state = Some(KeyboardDrag {
            active_id: focused_id.to_string(),
            over_id: focused_id.to_string(),
        });
        return KeyOutcome::PickedUp {
            active_id: focused_id.to_string(),
        };
    };

    match key {
        "ArrowDown" | "ArrowRight" | "ArrowUp" | "ArrowLeft" => {
            let forward = matches!(key, "ArrowDown" | "ArrowRight");
            match step(ids, &drag.over_id, forward) {
                Some(next) => {
                    drag.over_id = next;
                    KeyOutcome::Moved {
                        active_id: drag.active_id.clone(),
                        over_id: drag.over_id.clone(),
                    }
                }
                None => KeyOutcome::Ignored,
            }
        }
        " " | "Enter" => {
            let KeyboardDrag { active_id, over_id } = drag.clone();
            *state = None;
            KeyOutcome::Dropped(DragEndEvent {
                active_id,
                over_id: Some(over_id),
            })
        }
        "Escape" => {
            let active_id = drag.active_id.clone();
            *state = None;
            KeyOutcome::Cancelled { active_id }
        }
        _ => KeyOutcome::Ignored,
    }
}
