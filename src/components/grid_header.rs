//! Grid Header Component
//!
//! Column titles for one table. Titles drag to reorder, the right edge
//! drags to resize, and the trailing slot opens the add-column form.

use grid_engine::{Column, SchemaTarget};
use leptos::ev;
use leptos::prelude::*;
use leptos_dragdrop::{make_on_mouseleave, make_on_mousedown, make_on_target_mouseenter};

use super::{accepts_drop, column_key, AddColumnForm, LEADING_SLOT_WIDTH};
use crate::context::{AppContext, HeaderSlot};
use crate::store::{update_grid, use_app_store, with_grid, with_grid_untracked};

/// Header row for the main table, or for one item's subitem collection
#[component]
pub fn GridHeader(
    target: SchemaTarget,
    /// Owning item when this heads a subitem collection
    #[prop(optional)]
    item_id: Option<String>,
) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();

    let template = {
        let target = target.clone();
        move || {
            let columns = with_grid(&store, |grid| grid.grid_template(&target));
            format!("grid-template-columns: {LEADING_SLOT_WIDTH}px {columns};")
        }
    };

    let columns = {
        let target = target.clone();
        move || {
            with_grid(&store, |grid| {
                grid.schemas()
                    .schema(&target)
                    .map(|schema| schema.ordered().into_iter().cloned().collect::<Vec<_>>())
                    .unwrap_or_default()
            })
        }
    };

    let slot = HeaderSlot::new(target.clone(), item_id.clone());

    let leading = match (item_id, target.clone()) {
        (Some(item_id), SchemaTarget::Subitems(collection)) => {
            let checked = {
                let item_id = item_id.clone();
                let collection = collection.clone();
                move || {
                    with_grid(&store, |grid| {
                        grid.forest()
                            .item(&item_id)
                            .is_some_and(|item| grid.selection().collection_selected(item, &collection))
                    })
                }
            };
            view! {
                <input
                    type="checkbox"
                    title="Select collection"
                    prop:checked=checked
                    on:change=move |ev| {
                        let should_select = event_target_checked(&ev);
                        update_grid(&store, |grid| grid.select_collection(&item_id, &collection, should_select));
                    }
                />
            }
            .into_any()
        }
        _ => view! {
            <input
                type="checkbox"
                title="Select all"
                prop:checked=move || with_grid(&store, |grid| grid.is_all_selected())
                on:change=move |ev| {
                    if event_target_checked(&ev) {
                        update_grid(&store, |grid| grid.select_all());
                    } else {
                        update_grid(&store, |grid| grid.deselect_all());
                    }
                }
            />
        }
        .into_any(),
    };

    let cell_target = target.clone();
    let form_slot = slot.clone();
    let is_adding = move || ctx.is_adding_column(&form_slot);

    view! {
        <div class="grid-header" style=template>
            <div class="grid-leading-slot">{leading}</div>
            <For
                each=columns
                key=|column| column.id.clone()
                children=move |column| view! { <HeaderCell target=cell_target.clone() column=column /> }
            />
            <div class="grid-add-column-slot">
                <button
                    class="add-column-btn"
                    title="Add column"
                    on:click=move |_| ctx.set_adding_column(Some(slot.clone()))
                >
                    "+"
                </button>
                <Show when=is_adding>
                    <AddColumnForm target=target.clone() />
                </Show>
            </div>
        </div>
    }
}

/// One column title with its drag and resize handles
#[component]
fn HeaderCell(target: SchemaTarget, column: Column) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let dnd = ctx.dnd;
    let store = use_app_store();

    let key = column_key(&target, &column.id);
    let on_mousedown = make_on_mousedown(dnd, key.clone());
    let on_mouseenter = make_on_target_mouseenter(dnd, key.clone(), move |dragged: &str, target: &str| {
        with_grid_untracked(&store, |grid| accepts_drop(grid, dragged, target))
    });
    let on_mouseleave = make_on_mouseleave(dnd);

    // Pointer x and column width when the resize began
    let resizing = RwSignal::new(None::<(i32, u32)>);
    let start_resize = {
        let target = target.clone();
        let column_id = column.id.clone();
        move |ev: ev::MouseEvent| {
            ev.stop_propagation();
            ev.prevent_default();
            let width = with_grid_untracked(&store, |grid| {
                grid.schemas()
                    .schema(&target)
                    .and_then(|schema| schema.get(&column_id))
                    .map(|column| column.width)
            });
            if let Some(width) = width {
                resizing.set(Some((ev.client_x(), width)));
            }
        }
    };

    let move_handle = {
        let target = target.clone();
        let column_id = column.id.clone();
        window_event_listener(ev::mousemove, move |ev| {
            let Some((start_x, start_width)) = resizing.get_untracked() else {
                return;
            };
            let width = (i64::from(start_width) + i64::from(ev.client_x() - start_x)).max(0);
            let width = u32::try_from(width).unwrap_or(u32::MAX);
            update_grid(&store, |grid| grid.resize_column(&target, &column_id, width));
        })
    };
    let up_handle = window_event_listener(ev::mouseup, move |_| {
        if resizing.get_untracked().is_some() {
            resizing.set(None);
        }
    });
    on_cleanup(move || {
        move_handle.remove();
        up_handle.remove();
    });

    let Column { title, pinned, resizable, .. } = column;
    let dragging_key = key.clone();
    let target_key = key;
    let class = move || {
        let mut class = String::from("grid-header-cell");
        if pinned {
            class.push_str(" pinned");
        }
        if dnd.is_dragging(&dragging_key) {
            class.push_str(" dragging");
        }
        if dnd.is_drop_target(&target_key) {
            class.push_str(" drop-target");
        }
        if resizing.with(Option::is_some) {
            class.push_str(" resizing");
        }
        class
    };

    view! {
        <div
            class=class
            on:mousedown=on_mousedown
            on:mouseenter=on_mouseenter
            on:mouseleave=on_mouseleave
        >
            <span class="grid-header-title">{title}</span>
            <Show when=move || resizable>
                <div class="resize-handle" on:mousedown=start_resize.clone()></div>
            </Show>
        </div>
    }
}
