//! Application Context
//!
//! Shared state provided via Leptos Context API.

use grid_engine::SchemaTarget;
use leptos::prelude::*;
use leptos_dragdrop::DndSignals;

/// One header's add-column slot: the table plus, for subitem
/// collections, the item whose section it heads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSlot {
    pub target: SchemaTarget,
    pub item_id: Option<String>,
}

impl HeaderSlot {
    pub fn new(target: SchemaTarget, item_id: Option<String>) -> Self {
        Self { target, item_id }
    }
}

/// App-wide signals provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Message shown in the status bar - read
    pub notice: ReadSignal<Option<String>>,
    /// Message shown in the status bar - write
    set_notice: WriteSignal<Option<String>>,
    /// Which header's add-column form is open - read
    pub adding_column: ReadSignal<Option<HeaderSlot>>,
    /// Which header's add-column form is open - write
    set_adding_column: WriteSignal<Option<HeaderSlot>>,
    /// Row and column drag state
    pub dnd: DndSignals,
}

impl AppContext {
    pub fn new(
        notice: (ReadSignal<Option<String>>, WriteSignal<Option<String>>),
        adding_column: (ReadSignal<Option<HeaderSlot>>, WriteSignal<Option<HeaderSlot>>),
        dnd: DndSignals,
    ) -> Self {
        Self {
            notice: notice.0,
            set_notice: notice.1,
            adding_column: adding_column.0,
            set_adding_column: adding_column.1,
            dnd,
        }
    }

    /// Show a message until the next one
    pub fn notify(&self, message: impl Into<String>) {
        self.set_notice.set(Some(message.into()));
    }

    pub fn clear_notice(&self) {
        self.set_notice.set(None);
    }

    /// Open the add-column form under one header (None closes it)
    pub fn set_adding_column(&self, slot: Option<HeaderSlot>) {
        self.set_adding_column.set(slot);
    }

    pub fn is_adding_column(&self, slot: &HeaderSlot) -> bool {
        self.adding_column.with(|open| open.as_ref() == Some(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_slots_are_per_item() {
        let roles = SchemaTarget::subitems("roles");
        let ada = HeaderSlot::new(roles.clone(), Some("u-ada".into()));
        assert_eq!(ada, HeaderSlot::new(roles.clone(), Some("u-ada".into())));
        assert_ne!(ada, HeaderSlot::new(roles.clone(), Some("u-bob".into())));
        assert_ne!(HeaderSlot::new(SchemaTarget::Main, None), HeaderSlot::new(roles, None));
    }
}
