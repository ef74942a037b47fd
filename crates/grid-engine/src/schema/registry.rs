//! Schema Registry
//!
//! Routes schema commands to the main schema or a subitem collection's
//! schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::column_positioning::ColumnPositioning;
use super::column_schema::ColumnSchema;
use crate::domain::{Column, ColumnKind, GridError, GridResult, ADD_COLUMN_SLOT_WIDTH};

/// Which table a schema command addresses
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaTarget {
    Main,
    Subitems(String),
}

impl SchemaTarget {
    pub fn subitems(collection: impl Into<String>) -> Self {
        SchemaTarget::Subitems(collection.into())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSchemaRegistry {
    main: ColumnSchema,
    subitems: BTreeMap<String, ColumnSchema>,
}

impl ColumnSchemaRegistry {
    pub fn new(main: ColumnSchema, subitems: BTreeMap<String, ColumnSchema>) -> Self {
        Self { main, subitems }
    }

    pub fn main(&self) -> &ColumnSchema {
        &self.main
    }

    pub fn subitems(&self, collection: &str) -> Option<&ColumnSchema> {
        self.subitems.get(collection)
    }

    pub fn schema(&self, target: &SchemaTarget) -> Option<&ColumnSchema> {
        match target {
            SchemaTarget::Main => Some(&self.main),
            SchemaTarget::Subitems(name) => self.subitems.get(name),
        }
    }

    fn schema_mut(&mut self, target: &SchemaTarget) -> GridResult<&mut ColumnSchema> {
        match target {
            SchemaTarget::Main => Ok(&mut self.main),
            SchemaTarget::Subitems(name) => {
                self.subitems
                    .get_mut(name)
                    .ok_or_else(|| GridError::UnknownCollection {
                        name: name.clone(),
                    })
            }
        }
    }

    /// Every schema this registry holds, main first
    pub fn targets(&self) -> impl Iterator<Item = SchemaTarget> + '_ {
        std::iter::once(SchemaTarget::Main).chain(
            self.subitems
                .keys()
                .map(|name| SchemaTarget::Subitems(name.clone())),
        )
    }

    pub fn add_column(
        &mut self,
        target: &SchemaTarget,
        title: &str,
        kind: ColumnKind,
        options: Vec<String>,
    ) -> GridResult<Column> {
        self.schema_mut(target)?.add_column(title, kind, options)
    }

    pub fn resize_column(&mut self, target: &SchemaTarget, id: &str, width: u32) -> Option<Column> {
        self.schema_mut(target).ok()?.resize_column(id, width)
    }

    pub fn reorder_column(&mut self, target: &SchemaTarget, dragged_id: &str, target_id: &str) -> bool {
        match self.schema_mut(target) {
            Ok(schema) => schema.reorder_column(dragged_id, target_id),
            Err(_) => false,
        }
    }

    /// Unknown targets lay out as the bare "+ add column" slot
    pub fn layout_template(&self, target: &SchemaTarget) -> Vec<u32> {
        self.schema(target)
            .map(ColumnSchema::layout_template)
            .unwrap_or_else(|| vec![ADD_COLUMN_SLOT_WIDTH])
    }
}
