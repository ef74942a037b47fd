//! Storage-boundary adapters
//!
//! Converters between the grid's field values and the shapes a storage
//! backend hands over.

pub mod pg_array;

pub use pg_array::PgArrayError;
