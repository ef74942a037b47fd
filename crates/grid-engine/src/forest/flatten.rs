//! Row Flattening
//!
//! Helper for rendering the forest as a flat list of rows.

use std::collections::BTreeSet;

use super::node::NodeRef;
use super::store::RowForest;

/// Render the forest as indented rows
/// Returns (node, depth) pairs in display order; subitems of an item only
/// appear when its id is in `expanded`
pub fn flatten_rows<'a>(
    forest: &'a RowForest,
    expanded: &BTreeSet<String>,
) -> Vec<(NodeRef<'a>, usize)> {
    let mut result = Vec::new();
    for item in forest.items() {
        result.push((NodeRef::Item(item), 0));
        if !expanded.contains(&item.id) {
            continue;
        }

        // Configured collections first, then anything the loader brought in
        let configured = forest.collection_names().iter().map(String::as_str);
        let extra = item
            .subitem_collections
            .keys()
            .map(String::as_str)
            .filter(|name| !forest.has_collection(name));
        for name in configured.chain(extra) {
            let Some((collection, rows)) = item.subitem_collections.get_key_value(name) else {
                continue;
            };
            for subitem in rows {
                result.push((
                    NodeRef::Subitem {
                        parent: item,
                        collection,
                        subitem,
                    },
                    1,
                ));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Item, Subitem};
    use crate::schema::ColumnSchemaRegistry;

    #[test]
    fn test_flatten_rows() {
        let mut forest = RowForest::with_collections(vec!["perms".into(), "devices".into()]);
        forest.replace_items(
            vec![
                Item::new("1")
                    .with_subitems("devices", vec![Subitem::new("1d")])
                    .with_subitems("perms", vec![Subitem::new("1a"), Subitem::new("1b")]),
                Item::new("2").with_subitems("perms", vec![Subitem::new("2a")]),
            ],
            &ColumnSchemaRegistry::default(),
        );

        let expanded: BTreeSet<String> = ["1".to_string()].into();
        let rows = flatten_rows(&forest, &expanded);

        // 1, 1a, 1b (perms before devices), 1d, 2 (collapsed)
        let ids: Vec<(&str, usize)> = rows.iter().map(|(node, depth)| (node.id(), *depth)).collect();
        assert_eq!(
            ids,
            vec![("1", 0), ("1a", 1), ("1b", 1), ("1d", 1), ("2", 0)]
        );
        assert!(rows[0].0.is_item());
        assert_eq!(rows[3].0.drag_token().to_string(), "sub:1:1d");
    }

    #[test]
    fn test_flatten_collapsed() {
        let mut forest = RowForest::with_collections(vec!["perms".into()]);
        forest.replace_items(
            vec![Item::new("1").with_subitems("perms", vec![Subitem::new("1a")])],
            &ColumnSchemaRegistry::default(),
        );
        assert_eq!(flatten_rows(&forest, &BTreeSet::new()).len(), 1);
    }
}
