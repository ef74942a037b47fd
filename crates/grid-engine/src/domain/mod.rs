//! Domain Layer
//!
//! Plain data types shared by every manager. Nothing here knows about
//! selection, ordering or rendering.

mod column;
mod drag_token;
mod entity;
mod error;
mod row;

pub use column::{Column, ColumnKind, ADD_COLUMN_SLOT_WIDTH, MIN_COLUMN_WIDTH};
pub use drag_token::{DragToken, DragTokenError};
pub use entity::Entity;
pub(crate) use entity::position_of;
pub use error::{GridError, GridResult};
pub use row::{Fields, Item, Subitem};
