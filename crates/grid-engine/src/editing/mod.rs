//! Cell Edit Controller
//!
//! Per-row editing state. Each cell is viewing or editing; the grid-wide
//! trigger decides which gesture opens an editor, and blur, Enter or
//! Escape close it. Values are committed live while editing, so closing
//! never rolls anything back.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::domain::{Column, ColumnKind};

/// Gesture that opens a cell editor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditTrigger {
    Click,
    Hover,
    #[default]
    DoubleClick,
}

impl EditTrigger {
    pub fn opens_on(self, event: CellEvent) -> bool {
        matches!(
            (self, event),
            (EditTrigger::Click, CellEvent::Click)
                | (EditTrigger::Hover, CellEvent::MouseEnter)
                | (EditTrigger::DoubleClick, CellEvent::DoubleClick)
        )
    }
}

/// Pointer gestures a viewing cell can receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellEvent {
    Click,
    MouseEnter,
    DoubleClick,
}

/// Ways an editing cell returns to viewing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellExit {
    Blur,
    Enter,
    Escape,
}

impl CellExit {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Enter" => Some(CellExit::Enter),
            "Escape" => Some(CellExit::Escape),
            _ => None,
        }
    }
}

/// Input affordance for a column kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorKind {
    TextInput,
    Dropdown(Vec<String>),
    DatePicker,
    DateTimePicker,
    NumberInput,
    Checkbox,
    PeoplePicker,
    Custom(String),
}

impl EditorKind {
    pub fn for_column(column: &Column) -> Self {
        match &column.kind {
            ColumnKind::Text => EditorKind::TextInput,
            ColumnKind::Select => EditorKind::Dropdown(column.options.clone()),
            ColumnKind::Date => EditorKind::DatePicker,
            ColumnKind::Datetime => EditorKind::DateTimePicker,
            ColumnKind::Number => EditorKind::NumberInput,
            ColumnKind::Checkbox => EditorKind::Checkbox,
            ColumnKind::People => EditorKind::PeoplePicker,
            ColumnKind::Custom(name) => EditorKind::Custom(name.clone()),
        }
    }

    /// Convert raw input text to the value stored for this editor
    ///
    /// Number text that does not parse is kept as a string; the kind is
    /// an affordance, not a validator.
    pub fn parse_input(&self, raw: &str) -> Value {
        match self {
            EditorKind::NumberInput => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .or_else(|_| raw.trim().parse::<f64>().map(Value::from))
                .unwrap_or_else(|_| Value::String(raw.to_string())),
            EditorKind::Checkbox => Value::Bool(matches!(raw, "true" | "on" | "1")),
            _ => Value::String(raw.to_string()),
        }
    }
}

/// A live value change, ready for `RowForest::set_field`
#[derive(Debug, Clone, PartialEq)]
pub struct CellCommit {
    pub node_id: String,
    pub column_id: String,
    pub value: Value,
}

/// Editing state for the cells of one rendered row
#[derive(Debug, Clone, PartialEq)]
pub struct CellEditController {
    trigger: EditTrigger,
    node_id: String,
    cells: HashMap<String, bool>,
}

impl CellEditController {
    pub fn new(node_id: impl Into<String>, trigger: EditTrigger) -> Self {
        Self {
            trigger,
            node_id: node_id.into(),
            cells: HashMap::new(),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn trigger(&self) -> EditTrigger {
        self.trigger
    }

    pub fn is_editing(&self, column_id: &str) -> bool {
        self.cells.get(column_id).copied().unwrap_or(false)
    }

    /// Feed a pointer gesture; returns `true` if the cell started editing
    pub fn handle_event(&mut self, column_id: &str, event: CellEvent) -> bool {
        if !self.trigger.opens_on(event) || self.is_editing(column_id) {
            return false;
        }
        self.cells.insert(column_id.to_string(), true);
        trace!(node_id = %self.node_id, column_id, ?event, "cell editing");
        true
    }

    /// Return the cell to viewing; returns `true` if it was editing
    pub fn close(&mut self, column_id: &str, exit: CellExit) -> bool {
        let was_editing = self.is_editing(column_id);
        if was_editing {
            self.cells.insert(column_id.to_string(), false);
            trace!(node_id = %self.node_id, column_id, ?exit, "cell viewing");
        }
        was_editing
    }

    /// Close on Enter or Escape; other keys are ignored
    pub fn handle_key(&mut self, column_id: &str, key: &str) -> bool {
        match CellExit::from_key(key) {
            Some(exit) => self.close(column_id, exit),
            None => false,
        }
    }

    /// Live change from an open editor
    ///
    /// Changes to a cell that is not editing are dropped.
    pub fn change(&self, column_id: &str, value: Value) -> Option<CellCommit> {
        self.is_editing(column_id).then(|| CellCommit {
            node_id: self.node_id.clone(),
            column_id: column_id.to_string(),
            value,
        })
    }

    /// Every cell back to viewing
    pub fn reset(&mut self) {
        self.cells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_trigger_is_double_click() {
        assert_eq!(EditTrigger::default(), EditTrigger::DoubleClick);
        let trigger: EditTrigger = serde_json::from_str("\"hover\"").unwrap();
        assert_eq!(trigger, EditTrigger::Hover);
    }

    #[test]
    fn test_only_configured_trigger_opens() {
        let mut row = CellEditController::new("i1", EditTrigger::DoubleClick);
        assert!(!row.handle_event("name", CellEvent::Click));
        assert!(!row.handle_event("name", CellEvent::MouseEnter));
        assert!(row.handle_event("name", CellEvent::DoubleClick));
        assert!(row.is_editing("name"));
        assert!(!row.is_editing("email"));
    }

    #[test]
    fn test_hover_trigger() {
        let mut row = CellEditController::new("i1", EditTrigger::Hover);
        assert!(row.handle_event("name", CellEvent::MouseEnter));
        // mouse leaving is not an exit
        assert!(row.is_editing("name"));
        assert!(row.close("name", CellExit::Blur));
        assert!(!row.is_editing("name"));
    }

    #[test]
    fn test_keys_close_editor() {
        let mut row = CellEditController::new("i1", EditTrigger::Click);
        row.handle_event("name", CellEvent::Click);
        assert!(!row.handle_key("name", "a"));
        assert!(row.is_editing("name"));
        assert!(row.handle_key("name", "Enter"));
        assert!(!row.is_editing("name"));

        row.handle_event("name", CellEvent::Click);
        assert!(row.handle_key("name", "Escape"));
        assert!(!row.handle_key("name", "Escape"));
    }

    #[test]
    fn test_escape_keeps_committed_value() {
        let mut row = CellEditController::new("i1", EditTrigger::Click);
        row.handle_event("name", CellEvent::Click);
        let commit = row.change("name", Value::from("Grace")).unwrap();
        row.handle_key("name", "Escape");
        assert_eq!(commit.value, "Grace");
        assert_eq!(commit.node_id, "i1");
        assert!(row.change("name", Value::from("late")).is_none());
    }

    #[test]
    fn test_editor_kind_follows_column() {
        let column = Column::new("role", "Role", ColumnKind::Select).with_options(["Admin", "User"]);
        assert_eq!(
            EditorKind::for_column(&column),
            EditorKind::Dropdown(vec!["Admin".into(), "User".into()])
        );
        let number = EditorKind::for_column(&Column::new("n", "N", ColumnKind::Number));
        assert_eq!(number.parse_input(" 42 "), Value::from(42));
        assert_eq!(number.parse_input("4.5"), Value::from(4.5));
        assert_eq!(number.parse_input("abc"), Value::from("abc"));
        assert_eq!(EditorKind::Checkbox.parse_input("on"), Value::Bool(true));
    }

    #[test]
    fn test_reset() {
        let mut row = CellEditController::new("i1", EditTrigger::Click);
        row.handle_event("a", CellEvent::Click);
        row.handle_event("b", CellEvent::Click);
        row.reset();
        assert!(!row.is_editing("a") && !row.is_editing("b"));
    }
}
