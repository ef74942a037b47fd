//! Domain Layer - Core Entity Trait
//!
//! Every row and column is addressed by a string id that never changes
//! after creation.

/// Core trait for anything the grid addresses by id
pub trait Entity {
    /// Returns the entity's unique identifier
    fn id(&self) -> &str;
}

/// Index of the entity with `id` inside `rows`
pub(crate) fn position_of<T: Entity>(rows: &[T], id: &str) -> Option<usize> {
    rows.iter().position(|row| row.id() == id)
}
