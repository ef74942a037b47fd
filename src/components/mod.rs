//! UI Components
//!
//! Reusable Leptos components.

mod add_column_form;
mod drag_keys;
mod grid_cell;
mod grid_header;
mod grid_row;
mod grid_view;
mod subitem_section;

pub use add_column_form::AddColumnForm;
pub use drag_keys::{accepts_drop, column_key, parse_key, row_key};
pub use grid_cell::GridCell;
pub use grid_header::GridHeader;
pub use grid_row::GridRow;
pub use grid_view::GridView;
pub use subitem_section::SubitemSection;

/// Width of the checkbox / expand slot leading every row
pub const LEADING_SLOT_WIDTH: u32 = 64;
