//! Row Entities
//!
//! Items are top-level rows. Each item owns one ordered sequence of
//! subitems per configured collection name. Subitems never change owner.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::Entity;

/// Field values keyed by column id
pub type Fields = BTreeMap<String, Value>;

/// A child row belonging to exactly one (item, collection) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subitem {
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
}

impl Subitem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Fields::new(),
        }
    }

    pub fn with_field(mut self, column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(column_id.into(), value.into());
        self
    }

    pub fn field(&self, column_id: &str) -> Option<&Value> {
        self.fields.get(column_id)
    }
}

impl Entity for Subitem {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A top-level row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Never changes after creation
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default)]
    pub subitem_collections: BTreeMap<String, Vec<Subitem>>,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Fields::new(),
            subitem_collections: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(column_id.into(), value.into());
        self
    }

    pub fn with_subitems(mut self, collection: impl Into<String>, subitems: Vec<Subitem>) -> Self {
        self.subitem_collections.insert(collection.into(), subitems);
        self
    }

    pub fn field(&self, column_id: &str) -> Option<&Value> {
        self.fields.get(column_id)
    }

    /// Subitems of one collection, in display order
    pub fn collection(&self, name: &str) -> Option<&[Subitem]> {
        self.subitem_collections.get(name).map(Vec::as_slice)
    }

    /// Every subitem across all collections
    pub fn subitems(&self) -> impl Iterator<Item = &Subitem> {
        self.subitem_collections.values().flatten()
    }

    pub fn subitem_count(&self) -> usize {
        self.subitem_collections.values().map(Vec::len).sum()
    }

    pub fn has_subitems(&self) -> bool {
        self.subitem_collections.values().any(|rows| !rows.is_empty())
    }

    /// Collection holding the subitem `id`, if this item owns it
    pub fn collection_of(&self, id: &str) -> Option<&str> {
        self.subitem_collections
            .iter()
            .find(|(_, rows)| rows.iter().any(|sub| sub.id == id))
            .map(|(name, _)| name.as_str())
    }
}

impl Entity for Item {
    fn id(&self) -> &str {
        &self.id
    }
}
