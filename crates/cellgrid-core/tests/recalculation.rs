//! Integration tests for editing and recalculating a sheet through the public API

use cellgrid_core::{CellContent, CellValue, GridError, NamePolicy, Sheet};

fn number(value: CellValue) -> f64 {
    match value {
        CellValue::Number(n) => n,
        other => panic!("Expected number, got {:?}", other),
    }
}

#[test]
fn test_chain_recalculates_in_order() {
    let mut sheet = Sheet::new();
    sheet.set_contents("A", "1").unwrap();
    sheet.set_contents("B", "=A+1").unwrap();
    sheet.set_contents("C", "=B+1").unwrap();

    let order = sheet.set_contents("A", "5").unwrap();
    assert_eq!(order, ["A", "B", "C"]);
    assert_eq!(number(sheet.value("C")), 7.0);
}

#[test]
fn test_rejected_cycle_leaves_sheet_untouched() {
    let mut sheet = Sheet::new();
    sheet.set_contents("A", "=B+1").unwrap();
    let graph_before = sheet.graph().clone();

    let err = sheet.set_contents("B", "=A+1").unwrap_err();
    assert!(matches!(err, GridError::CircularDependency(_)));
    assert_eq!(sheet.content("B"), CellContent::Text(String::new()));
    assert!(!sheet.direct_dependents("A").contains("B"));
    assert_eq!(sheet.graph(), &graph_before);
}

#[test]
fn test_errors_propagate_downstream() {
    let mut sheet = Sheet::new();
    sheet.set_contents("A", "=1/0").unwrap();
    sheet.set_contents("B", "=A+1").unwrap();
    assert!(sheet.value("A").is_error());
    assert!(sheet.value("B").is_error());

    // Fixing the source heals the chain.
    sheet.set_contents("A", "2").unwrap();
    assert_eq!(number(sheet.value("B")), 3.0);
}

#[test]
fn test_replacing_formula_drops_old_edges() {
    let mut sheet = Sheet::new();
    sheet.set_contents("A", "=B+1").unwrap();
    assert!(sheet.direct_dependents("B").contains("A"));

    sheet.set_contents("A", "10").unwrap();
    assert!(sheet.direct_dependents("B").is_empty());
}

#[test]
fn test_same_content_twice_is_stable() {
    let mut sheet = Sheet::new();
    sheet.set_contents("A", "3").unwrap();
    sheet.set_contents("B", "=A*A").unwrap();
    let graph = sheet.graph().clone();
    let value = sheet.value("B");

    sheet.set_contents("B", "=A*A").unwrap();
    assert_eq!(sheet.graph(), &graph);
    assert_eq!(sheet.value("B"), value);
}

#[test]
fn test_replay_reproduces_values() {
    let mut sheet = Sheet::new();
    sheet.set_contents("X", "=Y / 4").unwrap();
    sheet.set_contents("Y", "10").unwrap();
    sheet.set_contents("Z", "=X - Y").unwrap();
    sheet.set_contents("T", "label").unwrap();

    let mut replayed = Sheet::new();
    for (name, content) in sheet.iter() {
        replayed
            .set_contents(name, &content.to_input_string())
            .unwrap();
    }

    for name in sheet.nonempty_cells() {
        assert_eq!(replayed.value(&name), sheet.value(&name), "value of {}", name);
    }
}

#[test]
fn test_uppercase_policy_applies_everywhere() {
    let mut sheet = Sheet::with_policy(NamePolicy::uppercase(), "default");
    sheet.set_contents("a1", "2").unwrap();
    sheet.set_contents("b1", "=a1 * 3").unwrap();

    assert_eq!(number(sheet.value("B1")), 6.0);
    assert_eq!(number(sheet.value("b1")), 6.0);
    assert!(sheet.direct_dependents("a1").contains("B1"));
}

#[test]
fn test_undo_and_redo_replay_edits() {
    let mut sheet = Sheet::new();
    sheet.set_contents("A", "1").unwrap();
    sheet.set_contents("B", "=A * 10").unwrap();
    sheet.set_contents("A", "2").unwrap();
    assert_eq!(number(sheet.value("B")), 20.0);

    sheet.undo().unwrap();
    assert_eq!(number(sheet.value("B")), 10.0);
    sheet.redo().unwrap();
    assert_eq!(number(sheet.value("B")), 20.0);
}

#[test]
fn test_long_chain_recalculates() {
    let mut sheet = Sheet::new();
    sheet.set_contents("C0", "1").unwrap();
    for i in 1..10_000 {
        sheet
            .set_contents(&format!("C{}", i), &format!("=C{} + 1", i - 1))
            .unwrap();
    }
    assert_eq!(number(sheet.value("C9999")), 10_000.0);

    let order = sheet.set_contents("C0", "2").unwrap();
    assert_eq!(order.len(), 10_000);
    assert_eq!(number(sheet.value("C9999")), 10_001.0);

    let err = sheet.set_contents("C0", "=C9999").unwrap_err();
    assert!(matches!(err, GridError::CircularDependency(_)));
    assert_eq!(number(sheet.value("C9999")), 10_001.0);
}
