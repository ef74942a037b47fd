//! Property-Based Tests for the Selection Cascade
//!
//! Property: after any sequence of selection and row-creation commands,
//! every item that owns subitems is selected exactly when all of them are,
//! and the select-all flag agrees with the full id set.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use grid_engine::{
    ColumnKind, ColumnSpec, FixedClock, GridConfig, GridEngine, Item, SequentialIds, Subitem,
};
use proptest::prelude::*;

// ============================================================================
// FIXTURES
// ============================================================================

fn make_engine() -> GridEngine {
    let mut config = GridConfig {
        subitem_collection_names: vec!["perms".into(), "devices".into()],
        main_columns: vec![ColumnSpec::new("name", "Name", ColumnKind::Text)],
        ..GridConfig::default()
    };
    config
        .subitem_columns
        .insert("perms".into(), vec![ColumnSpec::new("scope", "Scope", ColumnKind::Text)]);
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
    let mut engine =
        GridEngine::with_services(&config, Arc::new(SequentialIds::new("n")), clock).unwrap();
    engine.load_rows(vec![
        Item::new("p")
            .with_subitems("perms", vec![Subitem::new("p1"), Subitem::new("p2")])
            .with_subitems("devices", vec![Subitem::new("p3")]),
        Item::new("q").with_subitems("perms", vec![Subitem::new("q1")]),
        Item::new("r"),
    ]);
    engine
}

fn assert_cascade(engine: &GridEngine) {
    for item in engine.items() {
        if item.has_subitems() {
            let children = item.subitems().all(|sub| engine.is_selected(&sub.id));
            assert_eq!(engine.is_selected(&item.id), children, "item {}", item.id);
        }
    }
    let all = engine.forest().all_ids();
    let covered = all.iter().all(|id| engine.is_selected(id));
    assert_eq!(engine.is_all_selected(), !all.is_empty() && covered);
}

// ============================================================================
// ARBITRATORS
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Toggle(usize),
    Bulk(Vec<usize>, bool),
    SelectAll,
    DeselectAll,
    AddItem,
    AddSubitem(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<usize>().prop_map(Op::Toggle),
        2 => (prop::collection::vec(any::<usize>(), 0..5), any::<bool>())
            .prop_map(|(picks, select)| Op::Bulk(picks, select)),
        1 => Just(Op::SelectAll),
        1 => Just(Op::DeselectAll),
        1 => Just(Op::AddItem),
        2 => any::<usize>().prop_map(Op::AddSubitem),
    ]
}

fn pick(ids: &BTreeSet<String>, n: usize) -> String {
    ids.iter().nth(n % ids.len()).cloned().unwrap_or_default()
}

proptest! {
    #[test]
    fn cascade_holds_after_every_command(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut engine = make_engine();
        for op in ops {
            let ids = engine.forest().all_ids();
            match op {
                Op::Toggle(n) => {
                    engine.toggle(&pick(&ids, n));
                }
                Op::Bulk(picks, select) => {
                    let chosen: Vec<String> = picks.iter().map(|n| pick(&ids, *n)).collect();
                    engine.bulk_select(chosen, select);
                }
                Op::SelectAll => {
                    engine.select_all();
                    prop_assert_eq!(engine.selection().selected(), &engine.forest().all_ids());
                }
                Op::DeselectAll => {
                    engine.deselect_all();
                    prop_assert!(engine.selection().is_empty());
                }
                Op::AddItem => {
                    engine.add_item();
                }
                Op::AddSubitem(n) => {
                    let items = engine.items();
                    let parent = items[n % items.len()].id.clone();
                    engine.add_subitem(&parent, "perms").unwrap();
                }
            }
            assert_cascade(&engine);
        }
    }
}

#[test]
fn bulk_select_matches_sequential_toggles() {
    let mut bulk = make_engine();
    bulk.bulk_select(["p1", "p2", "p3"], true);

    let mut sequential = make_engine();
    for id in ["p1", "p2", "p3"] {
        sequential.toggle(id);
    }

    assert!(bulk.is_selected("p"));
    assert_eq!(bulk.selection().selected(), sequential.selection().selected());
}

#[test]
fn partial_bulk_select_leaves_parent_unselected() {
    let mut engine = make_engine();
    engine.bulk_select(["p1", "p2"], true);
    assert!(!engine.is_selected("p"));
    assert_cascade(&engine);
}
