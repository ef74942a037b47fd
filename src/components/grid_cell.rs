//! Grid Cell Component
//!
//! One field of one row. Viewing cells open on the grid's edit trigger;
//! editors commit on every change and close on blur, Enter or Escape.

use grid_engine::adapters::pg_array;
use grid_engine::{CellEditController, CellEvent, CellExit, EditorKind, GridEngine};
use leptos::html;
use leptos::prelude::*;
use serde_json::Value;

use crate::store::{update_grid, use_app_store, with_grid, with_grid_untracked};

/// Custom column kind holding a list of labels
const TAGS_KIND: &str = "tags";

/// Text shown for a stored value
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "✓".to_string(),
        Value::Bool(false) => String::new(),
        Value::Array(_) => pg_array::from_value(value).join(", "),
        other => other.to_string(),
    }
}

/// Text placed in an editor for a stored value
fn editor_text(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        other => display_value(other),
    }
}

/// Value stored for raw editor text
pub fn parse_editor_input(editor: &EditorKind, raw: &str) -> Value {
    match editor {
        EditorKind::Custom(kind) if kind == TAGS_KIND => Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(|label| Value::String(label.to_string()))
                .collect(),
        ),
        other => other.parse_input(raw),
    }
}

fn field_value(grid: &GridEngine, node_id: &str, column_id: &str) -> Value {
    grid.forest()
        .node(node_id)
        .and_then(|node| node.fields().get(column_id).cloned())
        .unwrap_or(Value::Null)
}

/// Editor for the column in the schema the row renders under
fn editor_for(grid: &GridEngine, node_id: &str, column_id: &str) -> EditorKind {
    let target = grid.forest().node(node_id).map(|node| node.schema_target());
    target
        .as_ref()
        .and_then(|target| grid.schemas().schema(target))
        .and_then(|schema| schema.get(column_id))
        .map(EditorKind::for_column)
        .unwrap_or(EditorKind::TextInput)
}

#[component]
pub fn GridCell(
    node_id: String,
    column_id: String,
    controller: RwSignal<CellEditController>,
) -> impl IntoView {
    let store = use_app_store();
    let editor = with_grid_untracked(&store, |grid| editor_for(grid, &node_id, &column_id));

    let value = {
        let node_id = node_id.clone();
        let column_id = column_id.clone();
        Signal::derive(move || with_grid(&store, |grid| field_value(grid, &node_id, &column_id)))
    };
    let editing = {
        let column_id = column_id.clone();
        Signal::derive(move || controller.with(|row| row.is_editing(&column_id)))
    };

    let open = {
        let column_id = column_id.clone();
        move |event: CellEvent| {
            controller.update(|row| {
                row.handle_event(&column_id, event);
            })
        }
    };
    let close = {
        let column_id = column_id.clone();
        move |exit: CellExit| {
            controller.update(|row| {
                row.close(&column_id, exit);
            })
        }
    };
    let on_key = {
        let column_id = column_id.clone();
        move |ev: web_sys::KeyboardEvent| {
            let key = ev.key();
            if CellExit::from_key(&key).is_some() {
                controller.update(|row| {
                    row.handle_key(&column_id, &key);
                });
            }
        }
    };
    // Live commit: Escape closes without restoring the old value
    let commit = {
        let column_id = column_id.clone();
        let editor = editor.clone();
        move |raw: String| {
            let value = parse_editor_input(&editor, &raw);
            if let Some(change) = controller.with_untracked(|row| row.change(&column_id, value)) {
                update_grid(&store, |grid| grid.commit(change));
            }
        }
    };

    let input_ref = NodeRef::<html::Input>::new();
    let select_ref = NodeRef::<html::Select>::new();
    Effect::new(move |_| {
        if let Some(input) = input_ref.get() {
            let _ = input.focus();
        }
        if let Some(select) = select_ref.get() {
            let _ = select.focus();
        }
    });

    let editor_view = move || match editor.clone() {
        EditorKind::Dropdown(options) => {
            let commit = commit.clone();
            let close = close.clone();
            view! {
                <select
                    class="cell-editor"
                    node_ref=select_ref
                    on:change=move |ev| commit(event_target_value(&ev))
                    on:blur=move |_| close(CellExit::Blur)
                    on:keydown=on_key.clone()
                >
                    {options.into_iter().map(|option| {
                        let current = option.clone();
                        let selected = move || value.with(|v| v.as_str() == Some(current.as_str()));
                        view! { <option value=option.clone() selected=selected>{option.clone()}</option> }
                    }).collect_view()}
                </select>
            }.into_any()
        }
        EditorKind::Checkbox => {
            let commit = commit.clone();
            let close = close.clone();
            view! {
                <input
                    class="cell-editor"
                    type="checkbox"
                    node_ref=input_ref
                    prop:checked=move || value.with(|v| v.as_bool().unwrap_or(false))
                    on:change=move |ev| commit(event_target_checked(&ev).to_string())
                    on:blur=move |_| close(CellExit::Blur)
                    on:keydown=on_key.clone()
                />
            }.into_any()
        }
        other => {
            let input_type = match other {
                EditorKind::DatePicker => "date",
                EditorKind::NumberInput => "number",
                _ => "text",
            };
            let commit = commit.clone();
            let close = close.clone();
            view! {
                <input
                    class="cell-editor"
                    type=input_type
                    node_ref=input_ref
                    prop:value=move || value.with(editor_text)
                    on:input=move |ev| commit(event_target_value(&ev))
                    on:blur=move |_| close(CellExit::Blur)
                    on:keydown=on_key.clone()
                />
            }.into_any()
        }
    };

    let on_click = open.clone();
    let on_enter = open.clone();
    view! {
        <div
            class=move || if editing.get() { "grid-cell editing" } else { "grid-cell" }
            on:click=move |_| on_click(CellEvent::Click)
            on:mouseenter=move |_| on_enter(CellEvent::MouseEnter)
            on:dblclick=move |_| open(CellEvent::DoubleClick)
        >
            <Show
                when=move || editing.get()
                fallback=move || view! {
                    <span class="cell-value">{move || value.with(display_value)}</span>
                }
            >
                {editor_view.clone()}
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_engine::{GridConfig, Item, Subitem};
    use serde_json::json;

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("Ada")), "Ada");
        assert_eq!(display_value(&json!(["Admins", "On call"])), "Admins, On call");
        assert_eq!(display_value(&json!(3)), "3");
        assert_eq!(display_value(&json!(false)), "");
        assert_eq!(display_value(&Value::Null), "");
    }

    #[test]
    fn test_tags_editor_splits_labels() {
        let tags = EditorKind::Custom(TAGS_KIND.to_string());
        assert_eq!(parse_editor_input(&tags, " a, b ,,c"), json!(["a", "b", "c"]));
        assert_eq!(parse_editor_input(&EditorKind::TextInput, "a, b"), json!("a, b"));
    }

    #[test]
    fn test_editor_follows_row_schema() {
        let config: GridConfig = serde_json::from_value(json!({
            "subitemCollectionNames": ["roles"],
            "mainColumns": [{ "id": "active", "title": "Active", "kind": "checkbox" }],
            "subitemColumns": {
                "roles": [{ "id": "active", "title": "Since", "kind": "date" }]
            }
        }))
        .unwrap();
        let mut grid = GridEngine::new(&config).unwrap();
        grid.load_rows(vec![Item::new("u1").with_subitems("roles", vec![Subitem::new("g1")])]);

        assert_eq!(editor_for(&grid, "u1", "active"), EditorKind::Checkbox);
        assert_eq!(editor_for(&grid, "g1", "active"), EditorKind::DatePicker);
        assert_eq!(editor_for(&grid, "missing", "active"), EditorKind::TextInput);
    }
}
