//! Row Positioning Operations
//!
//! Items reorder among items; subitems reorder only among the subitems of
//! the same (parent, collection). A drop that would cross either boundary
//! is rejected and leaves the forest untouched.

use tracing::debug;

use super::store::RowForest;
use crate::domain::{position_of, DragToken};

/// Trait for row positioning operations
pub trait RowPositioning {
    /// Move `dragged_id` to `target_id`'s index, shifting the rows between
    fn move_item(&mut self, dragged_id: &str, target_id: &str) -> bool;

    /// Same as `move_item`, scoped to one parent's collection
    fn move_subitem(&mut self, dragged: &DragToken, target: &DragToken) -> bool;

    /// Resolve a drop from its two tokens
    fn apply_drop(&mut self, source: &DragToken, target: &DragToken) -> bool {
        match (source, target) {
            (DragToken::Item { id: dragged }, DragToken::Item { id: target }) => {
                self.move_item(dragged, target)
            }
            (DragToken::Subitem { .. }, DragToken::Subitem { .. }) => {
                self.move_subitem(source, target)
            }
            _ => {
                debug!(%source, %target, "drop across item/subitem scope ignored");
                false
            }
        }
    }
}

/// Remove at `from`, reinsert at `to`
pub(crate) fn array_move<T>(rows: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= rows.len() || to >= rows.len() {
        return;
    }
    let row = rows.remove(from);
    rows.insert(to, row);
}

impl RowPositioning for RowForest {
    fn move_item(&mut self, dragged_id: &str, target_id: &str) -> bool {
        if dragged_id == target_id {
            return false;
        }
        let (Some(from), Some(to)) = (
            position_of(self.items(), dragged_id),
            position_of(self.items(), target_id),
        ) else {
            debug!(dragged_id, target_id, "item move with unknown id ignored");
            return false;
        };
        array_move(self.items_mut(), from, to);
        debug!(dragged_id, from, to, "item moved");
        true
    }

    fn move_subitem(&mut self, dragged: &DragToken, target: &DragToken) -> bool {
        let (
            DragToken::Subitem {
                parent_id,
                id: dragged_id,
            },
            DragToken::Subitem {
                parent_id: target_parent,
                id: target_id,
            },
        ) = (dragged, target)
        else {
            return false;
        };
        if parent_id != target_parent {
            debug!(%dragged, %target, "cross-parent subitem drop rejected");
            return false;
        }
        if dragged_id == target_id {
            return false;
        }

        let Some(item_index) = position_of(self.items(), parent_id) else {
            return false;
        };
        let (collection, from, to) = {
            let item = &self.items()[item_index];
            let Some(collection) = item.collection_of(dragged_id) else {
                return false;
            };
            if item.collection_of(target_id) != Some(collection) {
                debug!(%dragged, %target, "cross-collection subitem drop rejected");
                return false;
            }
            let rows = item.collection(collection).unwrap_or_default();
            let (Some(from), Some(to)) = (position_of(rows, dragged_id), position_of(rows, target_id))
            else {
                return false;
            };
            (collection.to_string(), from, to)
        };

        if let Some(rows) = self.items_mut()[item_index]
            .subitem_collections
            .get_mut(&collection)
        {
            array_move(rows, from, to);
        }
        debug!(parent_id = %parent_id, collection = %collection, from, to, "subitem moved");
        true
    }
}
