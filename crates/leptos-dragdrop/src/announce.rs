//! Screen-reader announcements for drag events

pub fn picked_up(active_id: &str) -> String {
    format!("Picked up item {}", active_id)
}

pub fn over(active_id: &str, over_id: Option<&str>) -> String {
    match over_id {
        Some(over_id) => format!("Item {} is over {}", active_id, over_id),
        None => format!("Item {} is no longer over a droppable area", active_id),
    }
}

pub fn dropped(active_id: &str, over_id: Option<&str>) -> String {
    match over_id {
        Some(over_id) => format!("Item {} was dropped over {}", active_id, over_id),
        None => format!("Item {} was dropped", active_id),
    }
}

pub fn cancelled(active_id: &str) -> String {
    format!("Dragging was cancelled. Item {} was dropped", active_id)
}
