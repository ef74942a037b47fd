//! Row Forest
//!
//! Items live behind an `Arc` and are mutated with `Arc::make_mut`, so a
//! clone taken before a command is an immutable snapshot of the old state.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::node::NodeRef;
use super::status_rule::STATUS_FIELD;
use crate::domain::{position_of, Column, Fields, GridError, GridResult, Item, Subitem};
use crate::schema::{ColumnSchema, ColumnSchemaRegistry, SchemaTarget};
use crate::services::{Clock, IdGenerator, SystemClock, UuidIds};

/// Where a node sits inside the forest
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Location {
    Item(usize),
    Subitem {
        item: usize,
        collection: String,
        index: usize,
    },
}

#[derive(Clone)]
pub struct RowForest {
    items: Arc<Vec<Item>>,
    collections: Arc<Vec<String>>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for RowForest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowForest")
            .field("items", &self.items)
            .field("collections", &self.collections)
            .finish_non_exhaustive()
    }
}

impl RowForest {
    pub fn new(collections: Vec<String>, ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            items: Arc::new(Vec::new()),
            collections: Arc::new(collections),
            ids,
            clock,
        }
    }

    /// Forest with UUID ids and the system clock
    pub fn with_collections(collections: Vec<String>) -> Self {
        Self::new(collections, Arc::new(UuidIds), Arc::new(SystemClock))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Configured subitem collection names, in display order
    pub fn collection_names(&self) -> &[String] {
        &self.collections
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.iter().any(|collection| collection == name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Find an item or subitem by id
    pub fn node(&self, id: &str) -> Option<NodeRef<'_>> {
        match self.locate(id)? {
            Location::Item(index) => Some(NodeRef::Item(&self.items[index])),
            Location::Subitem {
                item,
                collection,
                index,
            } => {
                let parent = &self.items[item];
                let (name, rows) = parent.subitem_collections.get_key_value(&collection)?;
                Some(NodeRef::Subitem {
                    parent,
                    collection: name,
                    subitem: rows.get(index)?,
                })
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.locate(id).is_some()
    }

    /// Parent item of a subitem
    pub fn parent_of(&self, subitem_id: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|item| item.subitems().any(|sub| sub.id == subitem_id))
    }

    /// Every item id and every subitem id across every collection
    pub fn all_ids(&self) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();
        for item in self.items.iter() {
            ids.insert(item.id.clone());
            ids.extend(item.subitems().map(|sub| sub.id.clone()));
        }
        ids
    }

    /// Ids of every subitem owned by `item_id`
    pub fn descendant_ids(&self, item_id: &str) -> Vec<String> {
        self.item(item_id)
            .map(|item| item.subitems().map(|sub| sub.id.clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn locate(&self, id: &str) -> Option<Location> {
        for (item_index, item) in self.items.iter().enumerate() {
            if item.id == id {
                return Some(Location::Item(item_index));
            }
            for (collection, rows) in &item.subitem_collections {
                if let Some(index) = position_of(rows, id) {
                    return Some(Location::Subitem {
                        item: item_index,
                        collection: collection.clone(),
                        index,
                    });
                }
            }
        }
        None
    }

    /// Next generated id not already taken by an item or subitem
    fn fresh_id(&self) -> String {
        loop {
            let id = self.ids.next_id();
            if !self.contains(&id) {
                return id;
            }
            debug!(id = %id, "generated id already in use, drawing another");
        }
    }

    /// Copy-on-write access to the item list
    pub(crate) fn items_mut(&mut self) -> &mut Vec<Item> {
        Arc::make_mut(&mut self.items)
    }

    fn fields_mut(&mut self, location: &Location) -> Option<&mut Fields> {
        let items = self.items_mut();
        match location {
            Location::Item(index) => items.get_mut(*index).map(|item| &mut item.fields),
            Location::Subitem {
                item,
                collection,
                index,
            } => items
                .get_mut(*item)?
                .subitem_collections
                .get_mut(collection)?
                .get_mut(*index)
                .map(|sub| &mut sub.fields),
        }
    }

    /// Append a blank item
    ///
    /// Every main-schema column is seeded with its default, then the
    /// caller's defaults are applied on top.
    pub fn add_item(&mut self, schema: &ColumnSchema, defaults: &Fields) -> Item {
        let mut item = Item::new(self.fresh_id());
        item.fields = seed_fields(schema, defaults);
        for name in self.collections.iter() {
            item.subitem_collections.insert(name.clone(), Vec::new());
        }
        debug!(item_id = %item.id, "item added");
        self.items_mut().push(item.clone());
        item
    }

    /// Append a blank subitem to one of an item's collections
    pub fn add_subitem(
        &mut self,
        item_id: &str,
        collection: &str,
        schema: &ColumnSchema,
        defaults: &Fields,
    ) -> GridResult<Subitem> {
        let item_index = position_of(&self.items, item_id).ok_or_else(|| GridError::UnknownParent {
            id: item_id.to_string(),
        })?;
        if !self.has_collection(collection) {
            return Err(GridError::UnknownCollection {
                name: collection.to_string(),
            });
        }

        let mut subitem = Subitem::new(self.fresh_id());
        subitem.fields = seed_fields(schema, defaults);
        self.items_mut()[item_index]
            .subitem_collections
            .entry(collection.to_string())
            .or_default()
            .push(subitem.clone());
        debug!(item_id, collection, subitem_id = %subitem.id, "subitem added");
        Ok(subitem)
    }

    /// Replace one field on an item or subitem
    ///
    /// Status changes also run the schema's status rule against the
    /// node's previous status. Returns `false` for unknown nodes.
    pub fn set_field(
        &mut self,
        node_id: &str,
        column_id: &str,
        value: Value,
        schemas: &ColumnSchemaRegistry,
    ) -> bool {
        let Some(location) = self.locate(node_id) else {
            debug!(node_id, column_id, "set_field on unknown node ignored");
            return false;
        };
        let rule = if column_id == STATUS_FIELD {
            let schema = match &location {
                Location::Item(_) => Some(schemas.main()),
                Location::Subitem { collection, .. } => schemas.subitems(collection),
            };
            schema.and_then(ColumnSchema::status_rule)
        } else {
            None
        };
        let now = self.clock.now();

        let Some(fields) = self.fields_mut(&location) else {
            return false;
        };
        let previous = fields.insert(column_id.to_string(), value.clone());
        if let Some(rule) = rule {
            if let Some(transition) = rule.transition(previous.as_ref(), &value) {
                rule.apply(transition, fields, now);
                debug!(node_id, ?transition, "status transition stamped dates");
            }
        }
        debug!(node_id, column_id, "field updated");
        true
    }

    /// Give every existing row of `target` the new column's key
    ///
    /// Rows that already carry the key keep their value. Returns the
    /// number of rows touched.
    pub fn backfill_column(&mut self, target: &SchemaTarget, column: &Column) -> usize {
        let mut touched = 0;
        for item in self.items_mut().iter_mut() {
            match target {
                SchemaTarget::Main => {
                    item.fields
                        .entry(column.id.clone())
                        .or_insert_with(|| column.empty_value());
                    touched += 1;
                }
                SchemaTarget::Subitems(name) => {
                    for sub in item.subitem_collections.get_mut(name).into_iter().flatten() {
                        sub.fields
                            .entry(column.id.clone())
                            .or_insert_with(|| column.empty_value());
                        touched += 1;
                    }
                }
            }
        }
        debug!(column_id = %column.id, touched, "column backfilled");
        touched
    }

    /// Swap in rows from the loader, shaped to the current schemas
    ///
    /// Missing collections are created empty and missing column keys get
    /// the column's empty value. Rows reusing an id seen earlier in the
    /// load (item or subitem) are dropped.
    pub fn replace_items(&mut self, items: Vec<Item>, schemas: &ColumnSchemaRegistry) {
        let mut items = drop_duplicate_ids(items);
        for item in &mut items {
            for name in self.collections.iter() {
                item.subitem_collections.entry(name.clone()).or_default();
            }
            fill_missing(&mut item.fields, schemas.main());
            for (name, rows) in item.subitem_collections.iter_mut() {
                if let Some(schema) = schemas.subitems(name) {
                    for sub in rows.iter_mut() {
                        fill_missing(&mut sub.fields, schema);
                    }
                }
            }
        }
        debug!(items = items.len(), "rows loaded");
        self.items = Arc::new(items);
    }
}

fn drop_duplicate_ids(items: Vec<Item>) -> Vec<Item> {
    let mut seen = HashSet::new();
    let mut dropped = Vec::new();
    let mut kept = Vec::with_capacity(items.len());
    for mut item in items {
        if !seen.insert(item.id.clone()) {
            dropped.push(item.id);
            continue;
        }
        for rows in item.subitem_collections.values_mut() {
            rows.retain(|sub| {
                let fresh = seen.insert(sub.id.clone());
                if !fresh {
                    dropped.push(sub.id.clone());
                }
                fresh
            });
        }
        kept.push(item);
    }
    if !dropped.is_empty() {
        warn!(?dropped, "duplicate row ids in loaded rows, keeping the first of each");
    }
    kept
}

fn seed_fields(schema: &ColumnSchema, defaults: &Fields) -> Fields {
    let mut fields: Fields = schema
        .columns()
        .iter()
        .map(|column| (column.id.clone(), column.default_value()))
        .collect();
    fields.extend(defaults.iter().map(|(k, v)| (k.clone(), v.clone())));
    fields
}

fn fill_missing(fields: &mut Fields, schema: &ColumnSchema) {
    for column in schema.columns() {
        fields
            .entry(column.id.clone())
            .or_insert_with(|| column.empty_value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ColumnKind;
    use crate::services::{FixedClock, SequentialIds};
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn make_registry() -> ColumnSchemaRegistry {
        let main = ColumnSchema::new(vec![
            Column::new("name", "Name", ColumnKind::Text).with_order(0),
            Column::new("status", "Status", ColumnKind::Select)
                .with_options(["Active", "Inactive"])
                .with_order(1),
            Column::new("startDate", "Start", ColumnKind::Date).with_order(2),
            Column::new("endDate", "End", ColumnKind::Date).with_order(3),
        ]);
        let mut subitems = BTreeMap::new();
        subitems.insert(
            "perms".to_string(),
            ColumnSchema::new(vec![
                Column::new("scope", "Scope", ColumnKind::Text).with_order(0),
                Column::new("level", "Level", ColumnKind::Number).with_order(1),
                Column::new("status", "Status", ColumnKind::Select)
                    .with_options(["Active", "Inactive"])
                    .with_order(2),
            ]),
        );
        subitems.insert("devices".to_string(), ColumnSchema::default());
        ColumnSchemaRegistry::new(main, subitems)
    }

    fn make_forest(clock: Arc<FixedClock>) -> RowForest {
        RowForest::new(
            vec!["perms".to_string(), "devices".to_string()],
            Arc::new(SequentialIds::new("n")),
            clock,
        )
    }

    fn make_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_add_item_seeds_columns_and_collections() {
        let registry = make_registry();
        let mut forest = make_forest(make_clock());
        let mut defaults = Fields::new();
        defaults.insert("name".to_string(), Value::from("New user"));

        let item = forest.add_item(registry.main(), &defaults);
        assert_eq!(item.id, "n1");
        assert_eq!(item.fields["name"], "New user");
        assert_eq!(item.fields["status"], "Active");
        assert!(item.collection("perms").unwrap().is_empty());
        assert!(item.collection("devices").unwrap().is_empty());
        assert_eq!(forest.len(), 1);
    }

    #[test]
    fn test_add_subitem_seeds_type_defaults() {
        let registry = make_registry();
        let mut forest = make_forest(make_clock());
        let item = forest.add_item(registry.main(), &Fields::new());

        let sub = forest
            .add_subitem(&item.id, "perms", registry.subitems("perms").unwrap(), &Fields::new())
            .unwrap();
        assert_eq!(sub.fields["scope"], "");
        assert_eq!(sub.fields["level"], 0);
        assert_eq!(forest.item(&item.id).unwrap().subitem_count(), 1);
        assert_eq!(forest.parent_of(&sub.id).unwrap().id, item.id);
    }

    #[test]
    fn test_add_subitem_unknown_parent() {
        let registry = make_registry();
        let mut forest = make_forest(make_clock());
        let result = forest.add_subitem("ghost", "perms", registry.subitems("perms").unwrap(), &Fields::new());
        assert!(matches!(result, Err(GridError::UnknownParent { .. })));

        let item = forest.add_item(registry.main(), &Fields::new());
        let result = forest.add_subitem(&item.id, "nope", &ColumnSchema::default(), &Fields::new());
        assert!(matches!(result, Err(GridError::UnknownCollection { .. })));
    }

    #[test]
    fn test_all_ids_spans_every_collection() {
        let registry = make_registry();
        let mut forest = make_forest(make_clock());
        let a = forest.add_item(registry.main(), &Fields::new());
        let b = forest.add_item(registry.main(), &Fields::new());
        let s1 = forest.add_subitem(&a.id, "perms", &ColumnSchema::default(), &Fields::new()).unwrap();
        let s2 = forest.add_subitem(&a.id, "devices", &ColumnSchema::default(), &Fields::new()).unwrap();

        let ids = forest.all_ids();
        assert_eq!(ids.len(), 4);
        for id in [&a.id, &b.id, &s1.id, &s2.id] {
            assert!(ids.contains(id));
        }
        assert_eq!(forest.descendant_ids(&a.id).len(), 2);
        assert!(forest.descendant_ids(&b.id).is_empty());
    }

    #[test]
    fn test_snapshot_is_not_affected_by_later_commands() {
        let registry = make_registry();
        let mut forest = make_forest(make_clock());
        let item = forest.add_item(registry.main(), &Fields::new());
        let snapshot = forest.clone();

        forest.set_field(&item.id, "name", Value::from("Grace"), &registry);
        forest.add_item(registry.main(), &Fields::new());

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.items()[0].fields["name"], "");
        assert_eq!(forest.items()[0].fields["name"], "Grace");
    }

    #[test]
    fn test_status_rule_on_items() {
        let registry = make_registry();
        let clock = make_clock();
        let mut forest = make_forest(clock.clone());
        let item = forest.add_item(registry.main(), &Fields::new());
        forest.set_field(&item.id, "startDate", Value::from("2024-01-01"), &registry);

        assert!(forest.set_field(&item.id, "status", Value::from("Inactive"), &registry));
        let fields = &forest.item(&item.id).unwrap().fields;
        assert_eq!(fields["status"], "Inactive");
        assert_eq!(fields["endDate"], "2024-06-01");
        assert_eq!(fields["startDate"], "2024-01-01");

        clock.advance(Duration::days(3));
        forest.set_field(&item.id, "status", Value::from("Active"), &registry);
        let fields = &forest.item(&item.id).unwrap().fields;
        assert_eq!(fields["endDate"], "");
        assert_eq!(fields["startDate"], "2024-06-04");
    }

    #[test]
    fn test_status_rule_on_subitems() {
        let registry = make_registry();
        let mut forest = make_forest(make_clock());
        let item = forest.add_item(registry.main(), &Fields::new());
        let sub = forest
            .add_subitem(&item.id, "perms", registry.subitems("perms").unwrap(), &Fields::new())
            .unwrap();

        forest.set_field(&sub.id, "status", Value::from("Inactive"), &registry);
        let node = forest.node(&sub.id).unwrap();
        assert_eq!(node.fields()["endDate"], "2024-06-01");
    }

    #[test]
    fn test_status_rule_skips_non_transitions() {
        let registry = make_registry();
        let mut forest = make_forest(make_clock());
        let item = forest.add_item(registry.main(), &Fields::new());

        // Active -> Active
        forest.set_field(&item.id, "status", Value::from("Active"), &registry);
        assert_eq!(forest.item(&item.id).unwrap().fields["endDate"], "");
    }

    #[test]
    fn test_set_field_unknown_node() {
        let registry = make_registry();
        let mut forest = make_forest(make_clock());
        assert!(!forest.set_field("ghost", "name", Value::from("x"), &registry));
    }

    #[test]
    fn test_backfill_main_and_subitems() {
        let registry = make_registry();
        let mut forest = make_forest(make_clock());
        for _ in 0..3 {
            forest.add_item(registry.main(), &Fields::new());
        }
        let first = forest.items()[0].id.clone();
        forest
            .add_subitem(&first, "perms", registry.subitems("perms").unwrap(), &Fields::new())
            .unwrap();

        let owner = Column::new("Owner", "Owner", ColumnKind::Text);
        assert_eq!(forest.backfill_column(&SchemaTarget::Main, &owner), 3);
        assert!(forest.items().iter().all(|item| item.fields["Owner"] == ""));

        let weight = Column::new("weight", "Weight", ColumnKind::Number);
        assert_eq!(forest.backfill_column(&SchemaTarget::subitems("perms"), &weight), 1);
        assert_eq!(forest.items()[0].collection("perms").unwrap()[0].fields["weight"], 0);
    }

    #[test]
    fn test_replace_items_conforms_shape() {
        let registry = make_registry();
        let mut forest = make_forest(make_clock());
        let loaded = Item::new("u1")
            .with_field("name", "Ada")
            .with_subitems("perms", vec![Subitem::new("p1")]);

        forest.replace_items(vec![loaded], &registry);
        let item = forest.item("u1").unwrap();
        assert_eq!(item.fields["name"], "Ada");
        assert_eq!(item.fields["status"], "");
        assert!(item.collection("devices").is_some());
        assert_eq!(item.collection("perms").unwrap()[0].fields["level"], 0);
    }

    #[test]
    fn test_generated_ids_skip_loaded_rows() {
        let registry = make_registry();
        let mut forest = make_forest(make_clock());
        forest.replace_items(
            vec![Item::new("n1").with_subitems("perms", vec![Subitem::new("n2")])],
            &registry,
        );

        let item = forest.add_item(registry.main(), &Fields::new());
        assert_eq!(item.id, "n3");
        let sub = forest
            .add_subitem("n1", "devices", &ColumnSchema::default(), &Fields::new())
            .unwrap();
        assert_eq!(sub.id, "n4");
        assert_eq!(forest.all_ids().len(), 4);
    }

    #[test]
    fn test_replace_items_drops_duplicate_ids() {
        let registry = make_registry();
        let mut forest = make_forest(make_clock());
        let loaded = vec![
            Item::new("u1")
                .with_field("name", "Ada")
                .with_subitems("perms", vec![Subitem::new("p1"), Subitem::new("p1")]),
            Item::new("u1").with_field("name", "Shadow"),
            Item::new("u2").with_subitems("devices", vec![Subitem::new("u1"), Subitem::new("d1")]),
            Item::new("p1"),
        ];

        forest.replace_items(loaded, &registry);
        let ids: Vec<&str> = forest.items().iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);
        assert_eq!(forest.item("u1").unwrap().fields["name"], "Ada");
        assert_eq!(forest.item("u1").unwrap().collection("perms").unwrap().len(), 1);
        let devices = forest.item("u2").unwrap().collection("devices").unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id, "d1");
        assert_eq!(forest.all_ids().len(), 4);
    }
}
