//! Selection Cascade Manager
//!
//! Keeps the selected id set consistent with the forest: an item that owns
//! subitems is selected exactly when every one of its subitems is. Items
//! without subitems are toggled directly.

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::Item;
use crate::forest::{NodeRef, RowForest};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionCascade {
    selected: BTreeSet<String>,
    all_selected: bool,
}

impl SelectionCascade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// True when every item and subitem id is selected
    ///
    /// Always false for an empty forest.
    pub fn is_all_selected(&self) -> bool {
        self.all_selected
    }

    /// Flip one row and cascade
    ///
    /// Toggling an item applies its new state to all of its subitems.
    /// Toggling a subitem re-derives its parent. Returns `false` for ids
    /// the forest does not hold.
    pub fn toggle(&mut self, forest: &RowForest, id: &str) -> bool {
        let Some(node) = forest.node(id) else {
            debug!(id, "toggle on unknown id ignored");
            return false;
        };
        let select = !self.selected.contains(id);
        self.set(id, select);
        match node {
            NodeRef::Item(item) => {
                for sub in item.subitems() {
                    self.set(&sub.id, select);
                }
            }
            NodeRef::Subitem { parent, .. } => self.derive_parent(parent),
        }
        self.refresh_all(forest);
        debug!(id, select, selected = self.selected.len(), "selection toggled");
        true
    }

    /// Apply membership for many ids, then reconcile once
    ///
    /// Parents of the touched subitems, and touched items that own
    /// subitems, are re-derived from their children afterwards. Unknown
    /// ids are skipped.
    pub fn bulk_select<I, S>(&mut self, forest: &RowForest, ids: I, should_select: bool)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parents: BTreeSet<String> = BTreeSet::new();
        for id in ids {
            let id = id.as_ref();
            match forest.node(id) {
                Some(NodeRef::Item(item)) => {
                    self.set(id, should_select);
                    parents.insert(item.id.clone());
                }
                Some(NodeRef::Subitem { parent, .. }) => {
                    self.set(id, should_select);
                    parents.insert(parent.id.clone());
                }
                None => debug!(id, "bulk select skipped unknown id"),
            }
        }
        for parent_id in &parents {
            if let Some(item) = forest.item(parent_id) {
                self.derive_parent(item);
            }
        }
        self.refresh_all(forest);
        debug!(
            parents = parents.len(),
            should_select,
            selected = self.selected.len(),
            "bulk selection applied"
        );
    }

    pub fn select_all(&mut self, forest: &RowForest) {
        self.selected = forest.all_ids();
        self.refresh_all(forest);
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
        self.all_selected = false;
    }

    /// Re-establish the cascade after the forest changed underneath
    ///
    /// Drops ids the forest no longer holds and re-derives every parent.
    pub fn reconcile(&mut self, forest: &RowForest) {
        let all = forest.all_ids();
        self.selected.retain(|id| all.contains(id));
        for item in forest.items() {
            self.derive_parent(item);
        }
        self.all_selected = !all.is_empty() && all.len() == self.selected.len();
    }

    /// Re-derive one item, e.g. after a subitem was added to it
    pub fn reconcile_item(&mut self, forest: &RowForest, item_id: &str) {
        if let Some(item) = forest.item(item_id) {
            self.derive_parent(item);
        }
        self.refresh_all(forest);
    }

    /// Every subitem of one collection is selected (false when empty)
    pub fn collection_selected(&self, item: &Item, collection: &str) -> bool {
        match item.collection(collection) {
            Some(rows) if !rows.is_empty() => rows.iter().all(|sub| self.is_selected(&sub.id)),
            _ => false,
        }
    }

    /// Whether the cascade and select-all flags agree with the forest
    pub fn is_consistent(&self, forest: &RowForest) -> bool {
        let parents_agree = forest.items().iter().filter(|item| item.has_subitems()).all(|item| {
            let children = item.subitems().all(|sub| self.is_selected(&sub.id));
            self.is_selected(&item.id) == children
        });
        let all = forest.all_ids();
        let expected_all = !all.is_empty() && all.iter().all(|id| self.is_selected(id));
        parents_agree && self.all_selected == expected_all
    }

    fn set(&mut self, id: &str, select: bool) {
        if select {
            self.selected.insert(id.to_string());
        } else {
            self.selected.remove(id);
        }
    }

    fn derive_parent(&mut self, item: &Item) {
        if !item.has_subitems() {
            return;
        }
        let all_children = item.subitems().all(|sub| self.selected.contains(&sub.id));
        self.set(&item.id, all_children);
    }

    fn refresh_all(&mut self, forest: &RowForest) {
        let all = forest.all_ids();
        self.all_selected = !all.is_empty() && all.iter().all(|id| self.selected.contains(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Subitem;
    use crate::schema::ColumnSchemaRegistry;

    fn make_forest() -> RowForest {
        let mut forest = RowForest::with_collections(vec!["perms".into(), "devices".into()]);
        forest.replace_items(
            vec![
                Item::new("p")
                    .with_subitems("perms", vec![Subitem::new("s1"), Subitem::new("s2")])
                    .with_subitems("devices", vec![Subitem::new("s3")]),
                Item::new("q"),
            ],
            &ColumnSchemaRegistry::default(),
        );
        forest
    }

    #[test]
    fn test_toggle_item_cascades_down() {
        let forest = make_forest();
        let mut selection = SelectionCascade::new();
        assert!(selection.toggle(&forest, "p"));
        for id in ["p", "s1", "s2", "s3"] {
            assert!(selection.is_selected(id), "{id} should be selected");
        }
        assert!(!selection.is_all_selected());

        selection.toggle(&forest, "p");
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_subitem_derives_parent() {
        let forest = make_forest();
        let mut selection = SelectionCascade::new();
        selection.toggle(&forest, "s1");
        selection.toggle(&forest, "s2");
        assert!(!selection.is_selected("p"));
        selection.toggle(&forest, "s3");
        assert!(selection.is_selected("p"));

        selection.toggle(&forest, "s2");
        assert!(!selection.is_selected("p"));
        assert!(selection.is_consistent(&forest));
    }

    #[test]
    fn test_leaf_item_toggles_directly() {
        let forest = make_forest();
        let mut selection = SelectionCascade::new();
        selection.toggle(&forest, "q");
        assert_eq!(selection.len(), 1);
        assert!(!selection.toggle(&forest, "missing"));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_select_all_and_deselect_all() {
        let forest = make_forest();
        let mut selection = SelectionCascade::new();
        selection.select_all(&forest);
        assert!(selection.is_all_selected());
        assert_eq!(selection.selected(), &forest.all_ids());

        selection.toggle(&forest, "s3");
        assert!(!selection.is_all_selected());
        assert!(!selection.is_selected("p"));

        selection.deselect_all();
        assert!(selection.is_empty());
        assert!(!selection.is_all_selected());
    }

    #[test]
    fn test_empty_forest_is_never_all_selected() {
        let forest = RowForest::with_collections(vec![]);
        let mut selection = SelectionCascade::new();
        selection.select_all(&forest);
        assert!(!selection.is_all_selected());
    }

    #[test]
    fn test_bulk_select_reconciles_once() {
        let forest = make_forest();
        let mut selection = SelectionCascade::new();
        selection.bulk_select(&forest, ["s1", "s2"], true);
        assert!(!selection.is_selected("p"));
        assert!(selection.collection_selected(forest.item("p").unwrap(), "perms"));
        assert!(!selection.collection_selected(forest.item("p").unwrap(), "devices"));

        selection.bulk_select(&forest, ["s3", "q"], true);
        assert!(selection.is_selected("p"));
        assert!(selection.is_all_selected());

        selection.bulk_select(&forest, ["s1"], false);
        assert!(!selection.is_selected("p"));
        assert!(!selection.is_all_selected());
        assert!(selection.is_consistent(&forest));
    }

    #[test]
    fn test_bulk_select_parent_without_children_is_rederived() {
        let forest = make_forest();
        let mut selection = SelectionCascade::new();
        selection.bulk_select(&forest, ["p"], true);
        assert!(!selection.is_selected("p"));
        assert!(selection.is_consistent(&forest));
    }

    #[test]
    fn test_reconcile_prunes_vanished_ids() {
        let mut forest = make_forest();
        let mut selection = SelectionCascade::new();
        selection.select_all(&forest);
        forest.replace_items(vec![Item::new("q")], &ColumnSchemaRegistry::default());
        selection.reconcile(&forest);
        assert_eq!(selection.len(), 1);
        assert!(selection.is_all_selected());
    }
}
