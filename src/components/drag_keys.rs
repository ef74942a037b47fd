//! Drag Keys
//!
//! Maps engine drag sources to the string keys the drag-and-drop signals
//! carry. Rows use the drag token wire format; column headers use a
//! `col:` prefix followed by their JSON handle.

use grid_engine::{DragSource, DragToken, GridEngine, SchemaTarget};

const COLUMN_PREFIX: &str = "col:";

pub fn row_key(token: &DragToken) -> String {
    token.encode()
}

pub fn column_key(target: &SchemaTarget, column_id: &str) -> String {
    let handle = serde_json::to_string(&(target, column_id)).unwrap_or_default();
    format!("{COLUMN_PREFIX}{handle}")
}

pub fn parse_key(key: &str) -> Option<DragSource> {
    if let Some(handle) = key.strip_prefix(COLUMN_PREFIX) {
        let (target, column_id): (SchemaTarget, String) = serde_json::from_str(handle).ok()?;
        return Some(DragSource::Column { target, column_id });
    }
    DragToken::decode(key).ok().map(DragSource::Row)
}

/// Hover feedback only for drops the engine could accept
pub fn accepts_drop(grid: &GridEngine, dragged: &str, target: &str) -> bool {
    match (parse_key(dragged), parse_key(target)) {
        (Some(source), Some(target)) => grid.accepts_drop(&source, &target),
        _ => false,
    }
}
