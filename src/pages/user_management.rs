//! User Management Page
//!
//! Users as items, their permission grants as subitems. Rows are seeded
//! locally; group lists arrive as Postgres array literals.

use grid_engine::adapters::pg_array;
use grid_engine::{GridConfig, GridEngine, GridResult, Item, Subitem};
use leptos::prelude::*;
use reactive_stores::Store;
use serde_json::Value;
use tracing::{info, warn};

use crate::components::GridView;
use crate::store::AppState;

const USER_GRID: &str = r#"{
    "subitemCollectionNames": ["Permissions"],
    "mainColumns": [
        {"id": "name", "title": "Name", "pinned": true},
        {"id": "email", "title": "Email", "width": 240},
        {"id": "role", "title": "Role", "kind": "select", "options": ["Viewer", "Editor", "Admin"]},
        {"id": "status", "title": "Status", "kind": "select", "options": ["Active", "Inactive"]},
        {"id": "startDate", "title": "Start date", "kind": "date"},
        {"id": "endDate", "title": "End date", "kind": "date"},
        {"id": "groups", "title": "Groups", "kind": "tags"}
    ],
    "subitemColumns": {
        "Permissions": [
            {"id": "resource", "title": "Resource"},
            {"id": "access", "title": "Access", "kind": "select", "options": ["Read", "Write", "Owner"]},
            {"id": "status", "title": "Status", "kind": "select", "options": ["Active", "Inactive"]},
            {"id": "startDate", "title": "Granted", "kind": "datetime"},
            {"id": "endDate", "title": "Revoked", "kind": "datetime"}
        ]
    },
    "defaults": {
        "item": {"role": "Viewer"},
        "subitem": {"access": "Read"}
    },
    "editTrigger": "doubleClick"
}"#;

/// Decode a stored group list; malformed literals become an empty list
fn groups(literal: &str) -> Value {
    pg_array::to_value(literal).unwrap_or_else(|e| {
        warn!(literal, error = %e, "unreadable group list");
        Value::Array(Vec::new())
    })
}

fn user(id: &str, name: &str, email: &str, role: &str, status: &str, groups_literal: &str) -> Item {
    Item::new(id)
        .with_field("name", name)
        .with_field("email", email)
        .with_field("role", role)
        .with_field("status", status)
        .with_field("startDate", "2024-01-08")
        .with_field("groups", groups(groups_literal))
}

fn grant(id: &str, resource: &str, access: &str) -> Subitem {
    Subitem::new(id)
        .with_field("resource", resource)
        .with_field("access", access)
        .with_field("status", "Active")
        .with_field("startDate", "2024-01-08T09:00:00Z")
}

fn seed_rows() -> Vec<Item> {
    vec![
        user("u-ada", "Ada Lovelace", "ada@example.com", "Admin", "Active", r#"{"Admins","On call"}"#)
            .with_subitems(
                "Permissions",
                vec![
                    grant("g-ada-billing", "Billing", "Owner"),
                    grant("g-ada-reports", "Reports", "Write"),
                ],
            ),
        user("u-grace", "Grace Hopper", "grace@example.com", "Editor", "Active", "{Compilers, Night shift}")
            .with_subitems("Permissions", vec![grant("g-grace-reports", "Reports", "Read")]),
        user("u-alan", "Alan Turing", "alan@example.com", "Viewer", "Inactive", "{}"),
    ]
}

/// Storage hand-off after each committed change
///
/// List fields go back out as array literals.
fn persist_rows(items: &[Item]) {
    let literals: Vec<String> = items
        .iter()
        .map(|item| {
            let groups = item.field("groups").map(pg_array::from_value).unwrap_or_default();
            pg_array::encode(&groups)
        })
        .collect();
    info!(users = items.len(), groups = ?literals, "user rows ready to save");
}

fn build_grid() -> GridResult<GridEngine> {
    let config = GridConfig::from_json(USER_GRID)?;
    let mut grid = GridEngine::new(&config)?.on_change(persist_rows);
    grid.load_rows(seed_rows());
    Ok(grid)
}

#[component]
pub fn UserManagementPage() -> impl IntoView {
    match build_grid() {
        Ok(grid) => {
            provide_context(Store::new(AppState::new("User Management", grid)));
            view! { <GridView /> }.into_any()
        }
        Err(e) => {
            let message = format!("Grid configuration error: {}", e);
            tracing::error!("{message}");
            view! { <p class="error">{message}</p> }.into_any()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_grid_config_is_valid() {
        let grid = build_grid().unwrap();
        assert_eq!(grid.items().len(), 3);
        assert_eq!(
            grid.items()[1].fields["groups"],
            serde_json::json!(["Compilers", "Night shift"])
        );
        assert!(grid.schemas().subitems("Permissions").is_some());
    }

    #[test]
    fn test_bad_group_literal_is_empty() {
        assert_eq!(groups("Admins"), Value::Array(Vec::new()));
    }
}
