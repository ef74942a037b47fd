//! Column Schema
//!
//! Columns are stored in insertion order; `Column::order` alone decides
//! display order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{
    position_of, Column, ColumnKind, GridResult, ADD_COLUMN_SLOT_WIDTH, MIN_COLUMN_WIDTH,
};
use crate::forest::StatusRule;

/// The ordered set of columns governing one table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    columns: Vec<Column>,
}

impl ColumnSchema {
    /// Build a schema, clamping widths and repairing duplicate orders
    pub fn new(columns: Vec<Column>) -> Self {
        let mut schema = Self { columns };
        for column in &mut schema.columns {
            column.width = column.width.max(MIN_COLUMN_WIDTH);
        }
        schema.densify_duplicate_orders();
        schema
    }

    /// Columns in insertion order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Columns in display order
    pub fn ordered(&self) -> Vec<&Column> {
        let mut ordered: Vec<&Column> = self.columns.iter().collect();
        ordered.sort_by_key(|column| column.order);
        ordered
    }

    pub fn get(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|column| column.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        position_of(&self.columns, id).is_some()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn max_order(&self) -> Option<i32> {
        self.columns.iter().map(|column| column.order).max()
    }

    /// Append a user-defined column at the end of the display order
    ///
    /// The id is the trimmed title, suffixed with a counter if taken.
    /// If `max_order + 1` would overflow, existing columns are renumbered
    /// densely first.
    pub fn add_column(
        &mut self,
        title: &str,
        kind: ColumnKind,
        options: Vec<String>,
    ) -> GridResult<Column> {
        let title = title.trim();
        let mut column = Column::new(self.unique_id(title), title, kind).with_options(options);
        column.validate()?;

        let order = self.next_order();
        column.order = order;
        debug!(column_id = %column.id, order, kind = column.kind.as_str(), "column added");
        self.columns.push(column.clone());
        Ok(column)
    }

    /// Clamp to [`MIN_COLUMN_WIDTH`]; columns marked not resizable keep their width
    pub fn resize_column(&mut self, id: &str, width: u32) -> Option<Column> {
        let column = self.get_mut(id)?;
        if column.resizable {
            column.width = width.max(MIN_COLUMN_WIDTH);
        }
        Some(column.clone())
    }

    /// Widths in display order plus the trailing "+ add column" slot
    pub fn layout_template(&self) -> Vec<u32> {
        self.ordered()
            .into_iter()
            .map(|column| column.width)
            .chain(std::iter::once(ADD_COLUMN_SLOT_WIDTH))
            .collect()
    }

    /// `layout_template` as a CSS `grid-template-columns` value
    pub fn grid_template(&self) -> String {
        self.layout_template()
            .iter()
            .map(|width| format!("{width}px"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn status_rule(&self) -> Option<StatusRule> {
        StatusRule::from_schema(self)
    }

    fn unique_id(&self, title: &str) -> String {
        if !self.contains(title) {
            return title.to_string();
        }
        (2..)
            .map(|n| format!("{title} {n}"))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| title.to_string())
    }

    fn next_order(&mut self) -> i32 {
        match self.max_order() {
            None => 0,
            Some(max) => max.checked_add(1).unwrap_or_else(|| {
                warn!(
                    columns = self.columns.len(),
                    "column order at i32::MAX, renumbering"
                );
                self.renumber_orders();
                self.columns.len() as i32
            }),
        }
    }

    fn densify_duplicate_orders(&mut self) {
        let mut seen = HashSet::new();
        if self.columns.iter().all(|column| seen.insert(column.order)) {
            return;
        }
        warn!(
            columns = self.columns.len(),
            "duplicate column orders in schema, renumbering"
        );
        self.renumber_orders();
    }

    /// Orders become `0..len`, keeping display order (ties by insertion)
    fn renumber_orders(&mut self) {
        let mut ranked: Vec<usize> = (0..self.columns.len()).collect();
        ranked.sort_by_key(|&index| (self.columns[index].order, index));
        for (order, index) in ranked.into_iter().enumerate() {
            self.columns[index].order = order as i32;
        }
    }
}
