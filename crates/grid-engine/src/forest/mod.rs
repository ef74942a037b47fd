//! Row Forest Store
//!
//! Items, their subitem collections, and the operations that move or
//! rewrite them.

mod flatten;
mod node;
mod positioning;
mod status_rule;
mod store;

pub use flatten::flatten_rows;
pub use node::NodeRef;
pub use positioning::RowPositioning;
pub use status_rule::{StatusRule, StatusTransition, END_DATE_FIELD, START_DATE_FIELD, STATUS_FIELD};
pub use store::RowForest;
