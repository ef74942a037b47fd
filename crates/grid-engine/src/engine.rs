//! Grid Engine Facade
//!
//! Composes the schema registry, row forest, selection cascade and drag
//! session behind one command surface for a UI layer. Callers may still
//! reach the managers directly through the accessors.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::{GridConfig, RowDefaults};
use crate::domain::{Column, ColumnKind, DragToken, GridError, GridResult, Item, Subitem};
use crate::editing::{CellCommit, CellEditController, EditTrigger};
use crate::forest::{flatten_rows, NodeRef, RowForest, RowPositioning};
use crate::schema::{ColumnSchemaRegistry, SchemaTarget};
use crate::selection::SelectionCascade;
use crate::services::{Clock, IdGenerator, SystemClock, UuidIds};

/// Called with the whole item forest after every committed mutation
pub type MutationCallback = Arc<dyn Fn(&[Item]) + Send + Sync>;

/// What the pointer picked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSource {
    Row(DragToken),
    Column {
        target: SchemaTarget,
        column_id: String,
    },
}

#[derive(Clone)]
pub struct GridEngine {
    schemas: ColumnSchemaRegistry,
    forest: RowForest,
    selection: SelectionCascade,
    defaults: RowDefaults,
    edit_trigger: EditTrigger,
    expanded: BTreeSet<String>,
    drag: Option<DragSource>,
    on_change: Option<MutationCallback>,
}

impl fmt::Debug for GridEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridEngine")
            .field("schemas", &self.schemas)
            .field("forest", &self.forest)
            .field("selection", &self.selection)
            .field("edit_trigger", &self.edit_trigger)
            .field("expanded", &self.expanded)
            .field("drag", &self.drag)
            .finish_non_exhaustive()
    }
}

impl GridEngine {
    pub fn new(config: &GridConfig) -> GridResult<Self> {
        Self::with_services(config, Arc::new(UuidIds), Arc::new(SystemClock))
    }

    pub fn with_services(
        config: &GridConfig,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> GridResult<Self> {
        config.validate()?;
        let schemas = config.build_registry();
        let forest = RowForest::new(config.subitem_collection_names.clone(), ids, clock);
        info!(
            collections = config.subitem_collection_names.len(),
            columns = schemas.main().len(),
            trigger = ?config.edit_trigger,
            "grid engine created"
        );
        Ok(Self {
            schemas,
            forest,
            selection: SelectionCascade::new(),
            defaults: config.defaults.clone(),
            edit_trigger: config.edit_trigger,
            expanded: BTreeSet::new(),
            drag: None,
            on_change: None,
        })
    }

    /// Register the mutation callback
    pub fn on_change(mut self, callback: impl Fn(&[Item]) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Arc::new(callback));
        self
    }

    pub fn schemas(&self) -> &ColumnSchemaRegistry {
        &self.schemas
    }

    pub fn forest(&self) -> &RowForest {
        &self.forest
    }

    pub fn selection(&self) -> &SelectionCascade {
        &self.selection
    }

    pub fn edit_trigger(&self) -> EditTrigger {
        self.edit_trigger
    }

    pub fn items(&self) -> &[Item] {
        self.forest.items()
    }

    /// Immutable copy of the current forest; later commands do not affect it
    pub fn snapshot(&self) -> RowForest {
        self.forest.clone()
    }

    /// Replace every row with rows from the loader
    ///
    /// Does not fire the mutation callback.
    pub fn load_rows(&mut self, items: Vec<Item>) {
        self.forest.replace_items(items, &self.schemas);
        self.selection.reconcile(&self.forest);
        let forest = &self.forest;
        self.expanded.retain(|id| forest.item(id).is_some());
    }

    /// Fresh editing state for one rendered row
    pub fn edit_controller(&self, node_id: impl Into<String>) -> CellEditController {
        CellEditController::new(node_id, self.edit_trigger)
    }

    // ========================
    // Rows
    // ========================

    pub fn add_item(&mut self) -> Item {
        let item = self.forest.add_item(self.schemas.main(), &self.defaults.item);
        self.selection.reconcile_item(&self.forest, &item.id);
        self.notify();
        item
    }

    pub fn add_subitem(&mut self, item_id: &str, collection: &str) -> GridResult<Subitem> {
        if self.forest.item(item_id).is_none() {
            return Err(GridError::UnknownParent {
                id: item_id.to_string(),
            });
        }
        let schema = self
            .schemas
            .subitems(collection)
            .ok_or_else(|| GridError::UnknownCollection {
                name: collection.to_string(),
            })?;
        let subitem = self
            .forest
            .add_subitem(item_id, collection, schema, &self.defaults.subitem)?;
        self.selection.reconcile_item(&self.forest, item_id);
        self.notify();
        Ok(subitem)
    }

    pub fn set_field(&mut self, node_id: &str, column_id: &str, value: Value) -> bool {
        let changed = self.forest.set_field(node_id, column_id, value, &self.schemas);
        if changed {
            self.notify();
        }
        changed
    }

    /// Apply a live change from a cell editor
    pub fn commit(&mut self, commit: CellCommit) -> bool {
        self.set_field(&commit.node_id, &commit.column_id, commit.value)
    }

    // ========================
    // Columns
    // ========================

    /// Add a column and give every existing row of that table its key
    pub fn add_column(
        &mut self,
        target: &SchemaTarget,
        title: &str,
        kind: ColumnKind,
        options: Vec<String>,
    ) -> GridResult<Column> {
        let column = self.schemas.add_column(target, title, kind, options)?;
        self.forest.backfill_column(target, &column);
        self.notify();
        Ok(column)
    }

    pub fn resize_column(&mut self, target: &SchemaTarget, id: &str, width: u32) -> Option<Column> {
        self.schemas.resize_column(target, id, width)
    }

    pub fn reorder_column(&mut self, target: &SchemaTarget, dragged_id: &str, target_id: &str) -> bool {
        self.schemas.reorder_column(target, dragged_id, target_id)
    }

    pub fn layout_template(&self, target: &SchemaTarget) -> Vec<u32> {
        self.schemas.layout_template(target)
    }

    /// `layout_template` as a CSS `grid-template-columns` value
    pub fn grid_template(&self, target: &SchemaTarget) -> String {
        self.layout_template(target)
            .iter()
            .map(|width| format!("{width}px"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    // ========================
    // Selection
    // ========================

    pub fn toggle(&mut self, id: &str) -> bool {
        self.selection.toggle(&self.forest, id)
    }

    pub fn bulk_select<I, S>(&mut self, ids: I, should_select: bool)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.selection.bulk_select(&self.forest, ids, should_select);
    }

    /// Select or clear every subitem of one collection of one item
    pub fn select_collection(&mut self, item_id: &str, collection: &str, should_select: bool) {
        let ids: Vec<String> = self
            .forest
            .item(item_id)
            .and_then(|item| item.collection(collection))
            .map(|rows| rows.iter().map(|sub| sub.id.clone()).collect())
            .unwrap_or_default();
        self.selection.bulk_select(&self.forest, ids, should_select);
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.forest);
    }

    pub fn deselect_all(&mut self) {
        self.selection.deselect_all();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.is_selected(id)
    }

    pub fn is_all_selected(&self) -> bool {
        self.selection.is_all_selected()
    }

    // ========================
    // Ordering
    // ========================

    pub fn move_item(&mut self, dragged_id: &str, target_id: &str) -> bool {
        let moved = self.forest.move_item(dragged_id, target_id);
        if moved {
            self.notify();
        }
        moved
    }

    pub fn move_subitem(&mut self, dragged: &DragToken, target: &DragToken) -> bool {
        let moved = self.forest.move_subitem(dragged, target);
        if moved {
            self.notify();
        }
        moved
    }

    pub fn drag_start(&mut self, source: DragSource) {
        debug!(?source, "drag started");
        self.drag = Some(source);
    }

    pub fn dragging(&self) -> Option<&DragSource> {
        self.drag.as_ref()
    }

    /// Whether a drop of `source` on `target` could move anything
    ///
    /// Items accept items; subitems accept siblings from the same
    /// collection of the same item; columns accept columns of their table.
    pub fn accepts_drop(&self, source: &DragSource, target: &DragSource) -> bool {
        match (source, target) {
            (DragSource::Row(DragToken::Item { .. }), DragSource::Row(DragToken::Item { .. })) => true,
            (
                DragSource::Row(DragToken::Subitem { parent_id, id }),
                DragSource::Row(DragToken::Subitem {
                    parent_id: target_parent,
                    id: target_id,
                }),
            ) => {
                parent_id == target_parent
                    && self.forest.item(parent_id).is_some_and(|item| {
                        let collection = item.collection_of(id);
                        collection.is_some() && collection == item.collection_of(target_id)
                    })
            }
            (DragSource::Column { target: a, .. }, DragSource::Column { target: b, .. }) => a == b,
            _ => false,
        }
    }

    /// Finish the drag on `target`
    ///
    /// Rows drop on rows and columns on columns of the same table; any
    /// other pairing ends the drag without effect.
    pub fn drop_on(&mut self, target: DragSource) -> bool {
        let Some(source) = self.drag.take() else {
            return false;
        };
        match (source, target) {
            (DragSource::Row(dragged), DragSource::Row(target)) => {
                let moved = self.forest.apply_drop(&dragged, &target);
                if moved {
                    self.notify();
                }
                moved
            }
            (
                DragSource::Column {
                    target: schema,
                    column_id: dragged,
                },
                DragSource::Column {
                    target: drop_schema,
                    column_id: target,
                },
            ) if schema == drop_schema => self.schemas.reorder_column(&schema, &dragged, &target),
            (source, target) => {
                debug!(?source, ?target, "drop across drag domains discarded");
                false
            }
        }
    }

    pub fn cancel_drag(&mut self) {
        if let Some(source) = self.drag.take() {
            debug!(?source, "drag cancelled");
        }
    }

    // ========================
    // View state
    // ========================

    /// Flip an item's expansion; returns the new state
    pub fn toggle_expanded(&mut self, item_id: &str) -> bool {
        if self.forest.item(item_id).is_none() {
            return false;
        }
        if self.expanded.remove(item_id) {
            false
        } else {
            self.expanded.insert(item_id.to_string());
            true
        }
    }

    pub fn is_expanded(&self, item_id: &str) -> bool {
        self.expanded.contains(item_id)
    }

    /// Rows in display order with their depth
    pub fn visible_rows(&self) -> Vec<(NodeRef<'_>, usize)> {
        flatten_rows(&self.forest, &self.expanded)
    }

    fn notify(&self) {
        if let Some(callback) = &self.on_change {
            callback(self.forest.items());
        }
    }
}
