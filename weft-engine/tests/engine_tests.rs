use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

use weft_engine::{
    builtin_registry, generate, ComponentInsertionOptions, DesignTokenSet, EngineConfig,
    EngineError, HistoryChange, InsertionEngine, LiveInstanceMap, Placement, PropValue, Rect,
};

fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, PropValue> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), PropValue::String(v.to_string())))
        .collect()
}

fn button(label: &str) -> ComponentInsertionOptions {
    ComponentInsertionOptions::new("button")
        .with_prop("children", PropValue::String(label.to_string()))
}

#[test]
fn generation_is_deterministic() {
    let registry = builtin_registry();
    let tokens = DesignTokenSet::default();
    let p = props(&[("children", "Submit")]);

    let first = generate(&registry, "button", &p, Some("outline"), &tokens).unwrap();
    let second = generate(&registry, "button", &p, Some("outline"), &tokens).unwrap();
    assert_eq!(first, second);
}

#[test]
fn insert_then_remove_restores_key_set() {
    let mut engine = InsertionEngine::new(builtin_registry());
    let tokens = DesignTokenSet::default();
    let mut live = LiveInstanceMap::new();

    engine.insert(&button("keep"), &tokens, &mut live).unwrap();
    let keys_before: Vec<String> = live.keys().cloned().collect();

    let inserted = engine.insert(&button("temp"), &tokens, &mut live).unwrap();
    engine.remove(&inserted.instance_id, &mut live).unwrap();

    let keys_after: Vec<String> = live.keys().cloned().collect();
    assert_eq!(keys_before, keys_after);
}

#[test]
fn undo_then_redo_restores_state_after_insert() {
    let mut engine = InsertionEngine::new(builtin_registry());
    let tokens = DesignTokenSet::default();
    let mut live = LiveInstanceMap::new();

    let inserted = engine.insert(&button("once"), &tokens, &mut live).unwrap();
    let snapshot = live.clone();

    // Undo: the controller translates an insert entry into a remove.
    let entry = engine.undo().unwrap();
    match &entry.change {
        HistoryChange::Insert { instance } => {
            live.remove(&instance.instance_id);
        }
        other => panic!("expected insert entry, got {:?}", other.kind()),
    }
    assert!(live.is_empty());

    // Redo: re-apply the captured snapshot, same instance id and props.
    let entry = engine.redo().unwrap();
    match entry.change {
        HistoryChange::Insert { instance } => {
            live.insert(instance.instance_id.clone(), instance);
        }
        other => panic!("expected insert entry, got {:?}", other.kind()),
    }

    assert_eq!(live, snapshot);
    assert_eq!(
        live[&inserted.instance_id].props,
        inserted.instance.props
    );
}

#[test]
fn history_is_bounded_with_pointer_at_tip() {
    let capacity = 10;
    let mut engine = InsertionEngine::with_config(
        builtin_registry(),
        EngineConfig {
            history_capacity: capacity,
            ..EngineConfig::default()
        },
    );
    let tokens = DesignTokenSet::default();
    let mut live = LiveInstanceMap::new();

    for n in 0..capacity + 7 {
        engine
            .insert(&button(&format!("b{}", n)), &tokens, &mut live)
            .unwrap();
    }

    assert_eq!(engine.history().len(), capacity);
    assert_eq!(engine.history().cursor(), capacity as isize - 1);
    assert!(!engine.history().can_redo());
}

#[test]
fn out_of_range_prop_never_mutates() {
    let mut registry = builtin_registry();
    let mut definition = registry.get("badge").unwrap().clone();
    definition.props.push(
        weft_engine::PropSpec::optional("count", weft_engine::PropKind::Number, PropValue::Number(1.0))
            .with_bounds(0.0, 99.0),
    );
    registry.register(definition);

    let mut engine = InsertionEngine::new(registry);
    let tokens = DesignTokenSet::default();
    let mut live = LiveInstanceMap::new();

    let options = ComponentInsertionOptions::new("badge")
        .with_prop("text", PropValue::String("hot".into()))
        .with_prop("count", PropValue::Number(250.0));

    let result = engine.insert(&options, &tokens, &mut live);
    match result {
        Err(EngineError::ValidationFailed { report, .. }) => {
            assert!(report.errors.iter().any(|e| e.contains("maximum")));
        }
        other => panic!("expected validation failure, got {:?}", other.is_ok()),
    }
    assert!(live.is_empty());
    assert!(engine.history().is_empty());
}

#[test]
fn token_application_is_idempotent() {
    let tokens = DesignTokenSet::default();
    let css = ".x{color:var(--color-primary);padding:var(--spacing-md);b:hsl(var(--color-accent));}";
    let once = tokens.apply(css);
    let twice = tokens.apply(&once);
    assert_eq!(once, twice);
}

// Scenario A: destructive button renders the literal label and the
// resolved destructive color, not the variable placeholder.
#[test]
fn destructive_button_resolves_label_and_color() {
    let registry = builtin_registry();
    let tokens = DesignTokenSet::default();

    let code = generate(
        &registry,
        "button",
        &props(&[("children", "Delete")]),
        Some("destructive"),
        &tokens,
    )
    .unwrap();

    assert!(code.html.contains("Delete"));
    assert!(code.css.contains("#dc2626"));
    assert!(!code.css.contains("var(--color-destructive)"));
}

// Scenario B: only the instance inside the queried area comes back.
#[test]
fn area_query_returns_only_contained_instance() {
    let mut engine = InsertionEngine::new(builtin_registry());
    let tokens = DesignTokenSet::default();
    let mut live = LiveInstanceMap::new();

    let first = engine
        .insert(&button("a").at(0.0, 0.0), &tokens, &mut live)
        .unwrap();
    engine
        .insert(&button("b").at(100.0, 100.0), &tokens, &mut live)
        .unwrap();

    let hits = engine.components_in_area(Rect::new(0.0, 0.0, 50.0, 50.0), &live);
    let ids: Vec<&str> = hits.iter().map(|i| i.instance_id.as_str()).collect();
    assert_eq!(ids, vec![first.instance_id.as_str()]);
}

// Scenario C: undo twice empties the map; redo twice restores both
// instances with their original ids.
#[test]
fn double_undo_then_double_redo_round_trips() {
    let mut engine = InsertionEngine::new(builtin_registry());
    let tokens = DesignTokenSet::default();
    let mut live = LiveInstanceMap::new();

    let a = engine.insert(&button("A"), &tokens, &mut live).unwrap();
    let b = engine.insert(&button("B"), &tokens, &mut live).unwrap();
    let full = live.clone();

    for _ in 0..2 {
        if let Some(entry) = engine.undo() {
            if let HistoryChange::Insert { instance } = entry.change {
                live.remove(&instance.instance_id);
            }
        }
    }
    assert!(live.is_empty());

    for _ in 0..2 {
        if let Some(entry) = engine.redo() {
            if let HistoryChange::Insert { instance } = entry.change {
                live.insert(instance.instance_id.clone(), instance);
            }
        }
    }
    assert_eq!(live, full);
    assert!(live.contains_key(&a.instance_id));
    assert!(live.contains_key(&b.instance_id));
}

#[test]
fn cursor_placement_inserts_at_pointer() {
    let mut engine = InsertionEngine::new(builtin_registry());
    let tokens = DesignTokenSet::default();
    let mut live = LiveInstanceMap::new();

    let inserted = engine
        .insert(
            &button("here")
                .with_placement(Placement::Cursor)
                .at(120.0, 80.0),
            &tokens,
            &mut live,
        )
        .unwrap();

    let p = inserted.instance.position.unwrap();
    assert_eq!((p.x, p.y), (120.0, 80.0));
}

#[test]
fn validation_is_pure_and_insert_is_gated() {
    let engine = InsertionEngine::new(builtin_registry());
    let live = LiveInstanceMap::new();

    let bad = ComponentInsertionOptions::new("button"); // missing `children`
    let report = engine.validate(&bad, &live);
    assert!(!report.is_valid);

    // Same call again: same result, no hidden state.
    assert_eq!(engine.validate(&bad, &live), report);
}
