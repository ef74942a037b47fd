//! Column Schema Registry
//!
//! One schema for the main table and one per subitem collection. Schemas
//! are independent: orders and ids only need to be unique within one.

mod column_positioning;
mod column_schema;
mod registry;

pub use column_positioning::ColumnPositioning;
pub use column_schema::ColumnSchema;
pub use registry::{ColumnSchemaRegistry, SchemaTarget};
