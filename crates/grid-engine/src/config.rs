//! Grid configuration
//!
//! The JSON document a host page hands the engine: collection names, the
//! column specs of every schema, row defaults and the edit trigger.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Column, ColumnKind, Fields, GridError, GridResult};
use crate::editing::EditTrigger;
use crate::schema::{ColumnSchema, ColumnSchemaRegistry};

fn default_true() -> bool {
    true
}

/// Column as written in config; unset fields take kind defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub kind: ColumnKind,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default = "default_true")]
    pub resizable: bool,
    /// Declaration index when unset
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

impl ColumnSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            width: None,
            resizable: true,
            order: None,
            pinned: false,
            options: Vec::new(),
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn into_column(self, index: usize) -> Column {
        let order = self
            .order
            .unwrap_or_else(|| i32::try_from(index).unwrap_or(i32::MAX));
        let mut column = Column::new(self.id, self.title, self.kind)
            .with_options(self.options)
            .with_order(order);
        if let Some(width) = self.width {
            column = column.with_width(width);
        }
        column.resizable = self.resizable;
        column.pinned = self.pinned;
        column
    }
}

/// Field values applied on top of schema defaults for new rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowDefaults {
    #[serde(default)]
    pub item: Fields,
    #[serde(default)]
    pub subitem: Fields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    #[serde(default)]
    pub subitem_collection_names: Vec<String>,
    #[serde(default)]
    pub main_columns: Vec<ColumnSpec>,
    /// Column specs per collection name; missing collections get no columns
    #[serde(default)]
    pub subitem_columns: BTreeMap<String, Vec<ColumnSpec>>,
    #[serde(default)]
    pub defaults: RowDefaults,
    #[serde(default)]
    pub edit_trigger: EditTrigger,
}

impl GridConfig {
    /// Parse and validate a camelCase JSON document
    pub fn from_json(json: &str) -> GridResult<Self> {
        let config: GridConfig = serde_json::from_str(json)?;
        config.validate()?;
        debug!(
            collections = config.subitem_collection_names.len(),
            main_columns = config.main_columns.len(),
            "grid config loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> GridResult<()> {
        let mut names = HashSet::new();
        for name in &self.subitem_collection_names {
            if name.trim().is_empty() {
                return Err(GridError::invalid_config("collection name must not be blank"));
            }
            if !names.insert(name.as_str()) {
                return Err(GridError::invalid_config(format!(
                    "collection {name:?} declared twice"
                )));
            }
        }
        for name in self.subitem_columns.keys() {
            if !names.contains(name.as_str()) {
                return Err(GridError::invalid_config(format!(
                    "subitemColumns names unknown collection {name:?}"
                )));
            }
        }

        validate_specs("main", &self.main_columns)?;
        for (name, specs) in &self.subitem_columns {
            validate_specs(name, specs)?;
        }
        Ok(())
    }

    /// One schema for the main table and one per collection
    pub fn build_registry(&self) -> ColumnSchemaRegistry {
        let main = build_schema(&self.main_columns);
        let subitems = self
            .subitem_collection_names
            .iter()
            .map(|name| {
                let specs = self.subitem_columns.get(name).map(Vec::as_slice).unwrap_or_default();
                (name.clone(), build_schema(specs))
            })
            .collect();
        ColumnSchemaRegistry::new(main, subitems)
    }
}

fn validate_specs(schema: &str, specs: &[ColumnSpec]) -> GridResult<()> {
    let mut ids = HashSet::new();
    for (index, spec) in specs.iter().enumerate() {
        if spec.id.trim().is_empty() {
            return Err(GridError::invalid_config(format!(
                "{schema} column #{index} has a blank id"
            )));
        }
        if !ids.insert(spec.id.as_str()) {
            return Err(GridError::invalid_config(format!(
                "{schema} column {:?} declared twice",
                spec.id
            )));
        }
        spec.clone()
            .into_column(index)
            .validate()
            .map_err(|err| GridError::invalid_config(format!("{schema} column {:?}: {err}", spec.id)))?;
    }
    Ok(())
}

fn build_schema(specs: &[ColumnSpec]) -> ColumnSchema {
    ColumnSchema::new(
        specs
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, spec)| spec.into_column(index))
            .collect(),
    )
}
