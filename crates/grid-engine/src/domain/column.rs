//! Column Entity
//!
//! A column belongs to exactly one schema (the main table or one subitem
//! collection). Its `order` is unique within that schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::Entity;
use super::error::{GridError, GridResult};

/// Narrowest width a column can be resized to
pub const MIN_COLUMN_WIDTH: u32 = 50;

/// Width of the trailing "+ add column" slot in every layout
pub const ADD_COLUMN_SLOT_WIDTH: u32 = 48;

/// Column kind determines the editor affordance and the default value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnKind {
    #[default]
    Text,
    Select,
    Date,
    Datetime,
    Number,
    Checkbox,
    People,
    /// Anything the grid does not know; rendered by a caller-supplied editor
    Custom(String),
}

impl ColumnKind {
    pub fn as_str(&self) -> &str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Select => "select",
            ColumnKind::Date => "date",
            ColumnKind::Datetime => "datetime",
            ColumnKind::Number => "number",
            ColumnKind::Checkbox => "checkbox",
            ColumnKind::People => "people",
            ColumnKind::Custom(name) => name,
        }
    }

    /// Width assigned to freshly added columns of this kind
    pub fn default_width(&self) -> u32 {
        match self {
            ColumnKind::Text => 200,
            ColumnKind::Select => 150,
            ColumnKind::Date => 140,
            ColumnKind::Datetime => 180,
            ColumnKind::Number => 110,
            ColumnKind::Checkbox => 80,
            ColumnKind::People => 160,
            ColumnKind::Custom(_) => 150,
        }
    }
}

impl From<&str> for ColumnKind {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "text" => ColumnKind::Text,
            "select" => ColumnKind::Select,
            "date" => ColumnKind::Date,
            "datetime" => ColumnKind::Datetime,
            "number" => ColumnKind::Number,
            "checkbox" => ColumnKind::Checkbox,
            "people" => ColumnKind::People,
            _ => ColumnKind::Custom(s.to_string()),
        }
    }
}

impl From<String> for ColumnKind {
    fn from(s: String) -> Self {
        ColumnKind::from(s.as_str())
    }
}

impl From<ColumnKind> for String {
    fn from(kind: ColumnKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Unique within the schema; also the field key on every row
    pub id: String,
    pub title: String,
    pub kind: ColumnKind,
    /// Never below [`MIN_COLUMN_WIDTH`]
    pub width: u32,
    pub resizable: bool,
    /// Display position, unique within the schema
    pub order: i32,
    pub pinned: bool,
    /// Choices for `select` columns, in display order
    #[serde(default)]
    pub options: Vec<String>,
}

impl Column {
    /// Create a column with the kind's default width
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: ColumnKind) -> Self {
        let width = kind.default_width();
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            width,
            resizable: true,
            order: 0,
            pinned: false,
            options: Vec::new(),
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width.max(MIN_COLUMN_WIDTH);
        self
    }

    /// Reject a blank title or a select column with nothing to select
    pub fn validate(&self) -> GridResult<()> {
        if self.title.trim().is_empty() {
            return Err(GridError::invalid_column("title must not be blank"));
        }
        if self.kind == ColumnKind::Select && self.options.is_empty() {
            return Err(GridError::invalid_column(format!(
                "select column {:?} needs at least one option",
                self.title
            )));
        }
        Ok(())
    }

    /// Value seeded into a freshly created row
    ///
    /// Select columns start on their first option.
    pub fn default_value(&self) -> Value {
        match self.kind {
            ColumnKind::Select => Value::String(self.options.first().cloned().unwrap_or_default()),
            _ => self.empty_value(),
        }
    }

    /// Value backfilled into existing rows when the column is added
    pub fn empty_value(&self) -> Value {
        match self.kind {
            ColumnKind::Number => Value::from(0),
            ColumnKind::Checkbox => Value::Bool(false),
            _ => Value::String(String::new()),
        }
    }
}

impl Entity for Column {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_strings() {
        assert_eq!(ColumnKind::from("datetime"), ColumnKind::Datetime);
        assert_eq!(ColumnKind::from("Select"), ColumnKind::Select);
        assert_eq!(
            ColumnKind::from("rating"),
            ColumnKind::Custom("rating".to_string())
        );
        assert_eq!(String::from(ColumnKind::People), "people");
    }

    #[test]
    fn test_column_serializes_kind_as_plain_string() {
        let column = Column::new("role", "Role", ColumnKind::Select).with_options(["Admin"]);
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["kind"], "select");
        assert_eq!(json["options"][0], "Admin");
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let column = Column::new("x", "   ", ColumnKind::Text);
        assert!(matches!(
            column.validate(),
            Err(GridError::InvalidColumn { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_select_without_options() {
        let column = Column::new("role", "Role", ColumnKind::Select);
        assert!(column.validate().is_err());
        assert!(column.with_options(["Admin"]).validate().is_ok());
    }

    #[test]
    fn test_default_and_empty_values() {
        let select = Column::new("s", "S", ColumnKind::Select).with_options(["A", "B"]);
        assert_eq!(select.default_value(), Value::from("A"));
        assert_eq!(select.empty_value(), Value::from(""));

        let number = Column::new("n", "N", ColumnKind::Number);
        assert_eq!(number.default_value(), Value::from(0));

        let date = Column::new("d", "D", ColumnKind::Date);
        assert_eq!(date.default_value(), Value::from(""));
    }

    #[test]
    fn test_with_width_clamps() {
        let column = Column::new("c", "C", ColumnKind::Text).with_width(10);
        assert_eq!(column.width, MIN_COLUMN_WIDTH);
    }
}
