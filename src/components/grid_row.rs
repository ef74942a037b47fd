//! Grid Row Component
//!
//! One item or subitem row: selection checkbox, expand toggle for items,
//! then one cell per column of its table.

use grid_engine::{DragToken, SchemaTarget};
use leptos::prelude::*;
use leptos_dragdrop::{make_on_mouseleave, make_on_mousedown, make_on_target_mouseenter};

use super::{accepts_drop, row_key, GridCell, LEADING_SLOT_WIDTH};
use crate::context::AppContext;
use crate::store::{update_grid, use_app_store, with_grid, with_grid_untracked};

#[component]
pub fn GridRow(
    node_id: String,
    token: DragToken,
    target: SchemaTarget,
    /// 0 for items, 1 for subitems
    depth: usize,
) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let dnd = ctx.dnd;
    let store = use_app_store();

    // Edit state lives with the row so it survives cell re-renders
    let controller = RwSignal::new(with_grid_untracked(&store, |grid| {
        grid.edit_controller(node_id.clone())
    }));

    let is_item = matches!(token, DragToken::Item { .. });
    let key = row_key(&token);
    let on_mousedown = make_on_mousedown(dnd, key.clone());
    let on_mouseenter = make_on_target_mouseenter(dnd, key.clone(), move |dragged: &str, target: &str| {
        with_grid_untracked(&store, |grid| accepts_drop(grid, dragged, target))
    });
    let on_mouseleave = make_on_mouseleave(dnd);

    let selected = {
        let node_id = node_id.clone();
        Signal::derive(move || with_grid(&store, |grid| grid.is_selected(&node_id)))
    };
    let expanded = {
        let node_id = node_id.clone();
        Signal::derive(move || with_grid(&store, |grid| grid.is_expanded(&node_id)))
    };
    let subitem_count = {
        let node_id = node_id.clone();
        Signal::derive(move || {
            with_grid(&store, |grid| {
                grid.forest().item(&node_id).map_or(0, |item| item.subitem_count())
            })
        })
    };

    let template = {
        let target = target.clone();
        move || {
            let columns = with_grid(&store, |grid| grid.grid_template(&target));
            format!("grid-template-columns: {LEADING_SLOT_WIDTH}px {columns};")
        }
    };
    let column_ids = {
        let target = target.clone();
        move || {
            with_grid(&store, |grid| {
                grid.schemas()
                    .schema(&target)
                    .map(|schema| schema.ordered().into_iter().map(|c| c.id.clone()).collect::<Vec<_>>())
                    .unwrap_or_default()
            })
        }
    };

    let dragging_key = key.clone();
    let target_key = key;
    let class = move || {
        let mut class = format!("grid-row depth-{depth}");
        if selected.get() {
            class.push_str(" selected");
        }
        if dnd.is_dragging(&dragging_key) {
            class.push_str(" dragging");
        }
        if dnd.is_drop_target(&target_key) {
            class.push_str(" drop-target");
        }
        class
    };

    let toggle_id = node_id.clone();
    let expand_id = node_id.clone();

    view! {
        <div
            class=class
            style=template
            on:mousedown=on_mousedown
            on:mouseenter=on_mouseenter
            on:mouseleave=on_mouseleave
        >
            <div class="grid-leading-slot">
                <input
                    type="checkbox"
                    prop:checked=move || selected.get()
                    on:change=move |_| {
                        update_grid(&store, |grid| grid.toggle(&toggle_id));
                    }
                />
                <Show when=move || is_item>
                    <button
                        class="expand-btn"
                        title=move || format!("{} subitems", subitem_count.get())
                        on:click={
                            let expand_id = expand_id.clone();
                            move |_| {
                                update_grid(&store, |grid| grid.toggle_expanded(&expand_id));
                            }
                        }
                    >
                        {move || if expanded.get() { "▼" } else { "▶" }}
                    </button>
                </Show>
            </div>
            <For
                each=column_ids
                key=|column_id| column_id.clone()
                children=move |column_id| view! {
                    <GridCell
                        node_id=node_id.clone()
                        column_id=column_id
                        controller=controller
                    />
                }
            />
            <div class="grid-add-column-slot"></div>
        </div>
    }
}
