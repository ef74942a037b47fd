//! Column Positioning Operations
//!
//! Column reordering is a transposition of two `order` values. Nothing
//! else moves, so orders stay unique without a reindex pass.

use tracing::debug;

use super::column_schema::ColumnSchema;

/// Trait for column positioning operations
pub trait ColumnPositioning {
    /// Swap the orders of `dragged_id` and `target_id`
    ///
    /// Returns `false` (and changes nothing) when either id is unknown or
    /// both ids are the same column.
    fn reorder_column(&mut self, dragged_id: &str, target_id: &str) -> bool;
}

impl ColumnPositioning for ColumnSchema {
    fn reorder_column(&mut self, dragged_id: &str, target_id: &str) -> bool {
        if dragged_id == target_id {
            return false;
        }
        let (Some(dragged_order), Some(target_order)) = (
            self.get(dragged_id).map(|column| column.order),
            self.get(target_id).map(|column| column.order),
        ) else {
            debug!(dragged_id, target_id, "column reorder with unknown id ignored");
            return false;
        };

        if let Some(column) = self.get_mut(dragged_id) {
            column.order = target_order;
        }
        if let Some(column) = self.get_mut(target_id) {
            column.order = dragged_order;
        }
        debug!(dragged_id, target_id, "column orders swapped");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, ColumnKind};

    fn make_schema() -> ColumnSchema {
        ColumnSchema::new(
            ["a", "b", "c", "d"]
                .iter()
                .enumerate()
                .map(|(i, id)| Column::new(*id, id.to_uppercase(), ColumnKind::Text).with_order(i as i32))
                .collect(),
        )
    }

    fn display_ids(schema: &ColumnSchema) -> Vec<String> {
        schema.ordered().iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn test_reorder_swaps_not_shifts() {
        let mut schema = make_schema();
        assert!(schema.reorder_column("a", "c"));
        // b stays put: transposition, not insert-before
        assert_eq!(display_ids(&schema), vec!["c", "b", "a", "d"]);
    }

    #[test]
    fn test_reorder_twice_restores() {
        let mut schema = make_schema();
        let before = schema.clone();
        schema.reorder_column("b", "d");
        schema.reorder_column("b", "d");
        assert_eq!(schema, before);
    }

    #[test]
    fn test_reorder_noops() {
        let mut schema = make_schema();
        let before = schema.clone();
        assert!(!schema.reorder_column("a", "a"));
        assert!(!schema.reorder_column("a", "zzz"));
        assert!(!schema.reorder_column("zzz", "a"));
        assert_eq!(schema, before);
    }
}
