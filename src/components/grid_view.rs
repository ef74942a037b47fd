//! Grid View Component
//!
//! Toolbar, main header and item rows. Expanded items render one section
//! per configured subitem collection. Owns the global drag binding.

use grid_engine::{DragToken, SchemaTarget};
use leptos::prelude::*;
use leptos_dragdrop::bind_global_mouseup;
use tracing::{debug, info};

use super::{parse_key, GridHeader, GridRow, SubitemSection};
use crate::context::AppContext;
use crate::store::{update_grid, use_app_store, with_grid, with_grid_untracked, AppStateStoreFields};

#[component]
pub fn GridView() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let dnd = ctx.dnd;
    let store = use_app_store();

    // Mirror the pointer's drag into the engine's drag session
    Effect::new(move |_| match dnd.dragging_read.get().as_deref().and_then(parse_key) {
        Some(source) => update_grid(&store, |grid| grid.drag_start(source)),
        None => {
            if with_grid_untracked(&store, |grid| grid.dragging().is_some()) {
                update_grid(&store, |grid| grid.cancel_drag());
            }
        }
    });

    bind_global_mouseup(dnd, move |dragged, target| {
        let (Some(source), Some(target)) = (parse_key(&dragged), parse_key(&target)) else {
            return;
        };
        let moved = update_grid(&store, |grid| {
            if grid.dragging() != Some(&source) {
                grid.drag_start(source);
            }
            grid.drop_on(target)
        });
        debug!(%dragged, moved, "drop handled");
    });

    let item_ids = move || {
        with_grid(&store, |grid| grid.items().iter().map(|item| item.id.clone()).collect::<Vec<_>>())
    };
    let selected_count = move || with_grid(&store, |grid| grid.selection().len());
    let add_item = move |_| {
        let item = update_grid(&store, |grid| grid.add_item());
        info!(item_id = %item.id, "item added");
    };

    view! {
        <div class="grid-view">
            <div class="grid-toolbar">
                <h2 class="grid-title">{move || store.title().get()}</h2>
                <button class="add-item-btn" on:click=add_item>"+ New row"</button>
                <span class="selection-count">
                    {move || match selected_count() {
                        0 => String::new(),
                        n => format!("{n} selected"),
                    }}
                </span>
            </div>
            <GridHeader target=SchemaTarget::Main />
            <div class="grid-body">
                <For
                    each=item_ids
                    key=|id| id.clone()
                    children=move |id| view! { <ItemBlock item_id=id /> }
                />
            </div>
        </div>
    }
}

/// An item row followed, when expanded, by its subitem sections
#[component]
fn ItemBlock(item_id: String) -> impl IntoView {
    let store = use_app_store();

    let expanded = {
        let item_id = item_id.clone();
        Signal::derive(move || with_grid(&store, |grid| grid.is_expanded(&item_id)))
    };
    let collections = with_grid_untracked(&store, |grid| grid.forest().collection_names().to_vec());
    let section_item_id = item_id.clone();

    view! {
        <div class="item-block">
            <GridRow
                node_id=item_id.clone()
                token=DragToken::item(item_id)
                target=SchemaTarget::Main
                depth=0
            />
            <Show when=move || expanded.get()>
                {collections.iter().map(|collection| view! {
                    <SubitemSection item_id=section_item_id.clone() collection=collection.clone() />
                }).collect_view()}
            </Show>
        </div>
    }
}
