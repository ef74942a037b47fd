//! Subitem Section Component
//!
//! One collection of an expanded item: its own header, its rows and an
//! add button.

use grid_engine::{DragToken, SchemaTarget};
use leptos::prelude::*;
use tracing::warn;

use super::{GridHeader, GridRow};
use crate::context::AppContext;
use crate::store::{update_grid, use_app_store, with_grid};

#[component]
pub fn SubitemSection(item_id: String, collection: String) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();
    let target = SchemaTarget::subitems(collection.clone());

    let subitem_ids = {
        let item_id = item_id.clone();
        let collection = collection.clone();
        move || {
            with_grid(&store, |grid| {
                grid.forest()
                    .item(&item_id)
                    .and_then(|item| item.collection(&collection))
                    .map(|rows| rows.iter().map(|sub| sub.id.clone()).collect::<Vec<_>>())
                    .unwrap_or_default()
            })
        }
    };

    let add_subitem = {
        let item_id = item_id.clone();
        let collection = collection.clone();
        move |_| {
            if let Err(e) = update_grid(&store, |grid| grid.add_subitem(&item_id, &collection)) {
                warn!(item_id = %item_id, collection = %collection, error = %e, "add subitem rejected");
                ctx.notify(e.to_string());
            }
        }
    };

    let row_item_id = item_id.clone();
    let row_target = target.clone();

    view! {
        <div class="subitem-section">
            <div class="subitem-section-title">{collection}</div>
            <GridHeader target=target item_id=item_id />
            <For
                each=subitem_ids
                key=|id| id.clone()
                children=move |id| view! {
                    <GridRow
                        node_id=id.clone()
                        token=DragToken::subitem(row_item_id.clone(), id)
                        target=row_target.clone()
                        depth=1
                    />
                }
            />
            <button class="add-subitem-btn" on:click=add_subitem>"+ Add"</button>
        </div>
    }
}
