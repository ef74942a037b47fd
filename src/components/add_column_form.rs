//! Add Column Form Component
//!
//! Title, kind and (for select columns) a comma separated option list.
//! Every existing row of the table receives the new column's key.

use grid_engine::{ColumnKind, SchemaTarget};
use leptos::prelude::*;
use tracing::{info, warn};

use crate::context::AppContext;
use crate::store::{update_grid, use_app_store};

/// Kinds offered in the form
const COLUMN_KINDS: &[(&str, &str)] = &[
    ("text", "Text"),
    ("select", "Select"),
    ("date", "Date"),
    ("datetime", "Date & time"),
    ("number", "Number"),
    ("checkbox", "Checkbox"),
    ("people", "People"),
    ("tags", "Tags"),
];

/// Option labels typed as `a, b, c`
fn parse_options(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|option| !option.is_empty())
        .map(str::to_string)
        .collect()
}

#[component]
pub fn AddColumnForm(target: SchemaTarget) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();

    let (title, set_title) = signal(String::new());
    let (kind, set_kind) = signal(String::from("text"));
    let (options, set_options) = signal(String::new());
    let is_select = move || kind.with(|kind| kind == "select");

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let kind = ColumnKind::from(kind.get_untracked());
        let options = if kind == ColumnKind::Select {
            parse_options(&options.get_untracked())
        } else {
            Vec::new()
        };
        let title = title.get_untracked();
        match update_grid(&store, |grid| grid.add_column(&target, &title, kind, options)) {
            Ok(column) => {
                info!(column_id = %column.id, ?target, "column added from form");
                set_title.set(String::new());
                set_options.set(String::new());
                ctx.set_adding_column(None);
            }
            Err(e) => {
                warn!(error = %e, "add column rejected");
                ctx.notify(e.to_string());
            }
        }
    };

    view! {
        <form class="add-column-form" on:submit=submit>
            <input
                type="text"
                placeholder="Column title"
                prop:value=move || title.get()
                on:input=move |ev| set_title.set(event_target_value(&ev))
            />
            <select on:change=move |ev| set_kind.set(event_target_value(&ev))>
                {COLUMN_KINDS.iter().map(|(value, label)| {
                    let value = *value;
                    view! {
                        <option value=value selected=move || kind.get() == value>{*label}</option>
                    }
                }).collect_view()}
            </select>
            <Show when=is_select>
                <input
                    type="text"
                    placeholder="Options, comma separated"
                    prop:value=move || options.get()
                    on:input=move |ev| set_options.set(event_target_value(&ev))
                />
            </Show>
            <div class="add-column-actions">
                <button type="submit">"Add"</button>
                <button type="button" on:click=move |_| ctx.set_adding_column(None)>
                    "Cancel"
                </button>
            </div>
        </form>
    }
}
