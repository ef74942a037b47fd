//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use grid_engine::GridEngine;
use leptos::prelude::*;
use reactive_stores::Store;

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Store)]
pub struct AppState {
    /// The grid behind the current page
    pub grid: GridEngine,
    /// Page heading
    pub title: String,
}

impl AppState {
    pub fn new(title: impl Into<String>, grid: GridEngine) -> Self {
        Self {
            grid,
            title: title.into(),
        }
    }
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Read the grid, tracking it
pub fn with_grid<T>(store: &AppStore, f: impl FnOnce(&GridEngine) -> T) -> T {
    f(&store.grid().read())
}

/// Read the grid without subscribing
pub fn with_grid_untracked<T>(store: &AppStore, f: impl FnOnce(&GridEngine) -> T) -> T {
    f(&store.grid().read_untracked())
}

/// Run one engine command and notify readers
pub fn update_grid<T>(store: &AppStore, f: impl FnOnce(&mut GridEngine) -> T) -> T {
    f(&mut store.grid().write())
}
