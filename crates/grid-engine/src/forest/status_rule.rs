//! Status-linked date stamping
//!
//! When a row's status flips between its two configured values, the
//! matching date fields are stamped or cleared. The rule reads only the
//! previous status of the same row.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::domain::{ColumnKind, Fields};
use crate::schema::ColumnSchema;

pub const STATUS_FIELD: &str = "status";
pub const START_DATE_FIELD: &str = "startDate";
pub const END_DATE_FIELD: &str = "endDate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    /// Active -> Inactive: `endDate` stamped
    Deactivated,
    /// Inactive -> Active: `endDate` cleared, `startDate` stamped
    Reactivated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StampFormat {
    Date,
    DateTime,
}

impl StampFormat {
    fn for_column(schema: &ColumnSchema, id: &str) -> Self {
        match schema.get(id).map(|column| &column.kind) {
            Some(ColumnKind::Datetime) => StampFormat::DateTime,
            _ => StampFormat::Date,
        }
    }

    fn stamp(self, now: DateTime<Utc>) -> Value {
        let text = match self {
            StampFormat::Date => now.format("%Y-%m-%d").to_string(),
            StampFormat::DateTime => now.to_rfc3339_opts(SecondsFormat::Secs, true),
        };
        Value::String(text)
    }
}

/// The two-value Active/Inactive status of one schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRule {
    active: String,
    inactive: String,
    start_format: StampFormat,
    end_format: StampFormat,
}

impl StatusRule {
    /// Derive the rule from the schema's `status` column
    ///
    /// Options named "Active"/"Inactive" (any case) win; otherwise the
    /// first two options are active and inactive. Fewer than two options
    /// means no rule.
    pub fn from_schema(schema: &ColumnSchema) -> Option<Self> {
        let status = schema.get(STATUS_FIELD)?;
        if status.options.len() < 2 {
            return None;
        }
        let named = |name: &str| {
            status
                .options
                .iter()
                .find(|option| option.eq_ignore_ascii_case(name))
                .cloned()
        };
        let (active, inactive) = match (named("active"), named("inactive")) {
            (Some(active), Some(inactive)) => (active, inactive),
            _ => (status.options[0].clone(), status.options[1].clone()),
        };
        if active == inactive {
            return None;
        }
        Some(Self {
            active,
            inactive,
            start_format: StampFormat::for_column(schema, START_DATE_FIELD),
            end_format: StampFormat::for_column(schema, END_DATE_FIELD),
        })
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn inactive(&self) -> &str {
        &self.inactive
    }

    /// Classify a status change
    pub fn transition(&self, previous: Option<&Value>, next: &Value) -> Option<StatusTransition> {
        let previous = previous.and_then(Value::as_str)?;
        let next = next.as_str()?;
        if previous == self.active && next == self.inactive {
            Some(StatusTransition::Deactivated)
        } else if previous == self.inactive && next == self.active {
            Some(StatusTransition::Reactivated)
        } else {
            None
        }
    }

    /// Stamp or clear the date fields for `transition`
    pub fn apply(&self, transition: StatusTransition, fields: &mut Fields, now: DateTime<Utc>) {
        match transition {
            StatusTransition::Deactivated => {
                fields.insert(END_DATE_FIELD.to_string(), self.end_format.stamp(now));
            }
            StatusTransition::Reactivated => {
                fields.insert(END_DATE_FIELD.to_string(), Value::String(String::new()));
                fields.insert(START_DATE_FIELD.to_string(), self.start_format.stamp(now));
            }
        }
    }
}
