//! Grid Engine
//!
//! State model for a two-level data grid: items that own named collections
//! of subitems, a column schema users can extend at runtime, cascading
//! multi-select, sibling-scoped reordering and per-cell edit state.
//!
//! Layered architecture:
//! - domain: columns, rows, drag tokens, errors
//! - schema: column schema registry (add / resize / reorder / layout)
//! - forest: row forest store, status rule, row positioning
//! - selection: cascading selection set
//! - editing: per-row cell edit controller
//! - engine: facade composing the managers for a UI layer
//! - adapters: storage-boundary serializers
//!
//! Nothing in here renders. Every command runs synchronously and leaves
//! previously taken snapshots untouched.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod editing;
pub mod engine;
pub mod forest;
pub mod schema;
pub mod selection;
pub mod services;

pub use config::{ColumnSpec, GridConfig, RowDefaults};
pub use domain::{
    Column, ColumnKind, DragToken, DragTokenError, Entity, Fields, GridError, GridResult, Item,
    Subitem, ADD_COLUMN_SLOT_WIDTH, MIN_COLUMN_WIDTH,
};
pub use editing::{CellCommit, CellEditController, CellEvent, CellExit, EditTrigger, EditorKind};
pub use engine::{DragSource, GridEngine, MutationCallback};
pub use forest::{flatten_rows, NodeRef, RowForest, RowPositioning, StatusRule};
pub use schema::{ColumnPositioning, ColumnSchema, ColumnSchemaRegistry, SchemaTarget};
pub use selection::SelectionCascade;
pub use services::{Clock, FixedClock, IdGenerator, SequentialIds, SystemClock, UuidIds};
