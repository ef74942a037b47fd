//! Node references
//!
//! A borrowed view of one row, carrying enough scope to build its drag
//! token and find its schema.

use crate::domain::{DragToken, Fields, Item, Subitem};
use crate::schema::SchemaTarget;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    Item(&'a Item),
    Subitem {
        parent: &'a Item,
        collection: &'a str,
        subitem: &'a Subitem,
    },
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            NodeRef::Item(item) => &item.id,
            NodeRef::Subitem { subitem, .. } => &subitem.id,
        }
    }

    pub fn fields(&self) -> &'a Fields {
        match self {
            NodeRef::Item(item) => &item.fields,
            NodeRef::Subitem { subitem, .. } => &subitem.fields,
        }
    }

    pub fn is_item(&self) -> bool {
        matches!(self, NodeRef::Item(_))
    }

    pub fn drag_token(&self) -> DragToken {
        match self {
            NodeRef::Item(item) => DragToken::item(item.id.clone()),
            NodeRef::Subitem {
                parent, subitem, ..
            } => DragToken::subitem(parent.id.clone(), subitem.id.clone()),
        }
    }

    /// Schema whose columns this row renders
    pub fn schema_target(&self) -> SchemaTarget {
        match self {
            NodeRef::Item(_) => SchemaTarget::Main,
            NodeRef::Subitem { collection, .. } => SchemaTarget::subitems(*collection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_node_scope() {
        let item = Item::new("u1");
        let node = NodeRef::Item(&item);
        assert!(node.is_item());
        assert_eq!(node.schema_target(), SchemaTarget::Main);
        assert_eq!(node.drag_token(), DragToken::item("u1"));
    }

    #[test]
    fn test_subitem_node_scope() {
        let item = Item::new("u1").with_subitems("roles", vec![Subitem::new("g1")]);
        let rows = item.collection("roles").unwrap();
        let node = NodeRef::Subitem {
            parent: &item,
            collection: "roles",
            subitem: &rows[0],
        };
        assert!(!node.is_item());
        assert_eq!(node.id(), "g1");
        assert_eq!(node.schema_target(), SchemaTarget::subitems("roles"));
        assert_eq!(node.drag_token(), DragToken::subitem("u1", "g1"));
    }
}
