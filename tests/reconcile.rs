//! Reconciler behavior on the standard row-list transitions.

use std::collections::BTreeSet;

use light_table::{apply_patches, detect, plan, remap_selection, Direction, PatchOp};

fn converge(previous: &[&'static str], current: &[&'static str]) -> Vec<&'static str> {
    let ops = plan(previous, current, detect(previous, current));
    let mut rows = previous.to_vec();
    apply_patches(&mut rows, ops.into_iter().map(PatchOp::cloned));
    rows
}

#[test]
fn test_no_op_is_empty() {
    let rows = ["a", "b", "c"];
    assert!(plan(&rows, &rows, detect(&rows, &rows)).is_empty());
}

#[test]
fn test_pure_append() {
    let previous = ["a", "b", "c"];
    let current = ["a", "b", "c", "d", "e"];
    assert_eq!(detect(&previous, &current), Direction::Forward);
    assert_eq!(
        plan(&previous, &current, Direction::Forward),
        vec![PatchOp::InsertAtTail(&"d"), PatchOp::InsertAtTail(&"e")]
    );
    assert_eq!(converge(&previous, &current), current);
}

#[test]
fn test_pure_prepend() {
    let previous = ["b", "c"];
    let current = ["a", "b", "c"];
    assert_eq!(detect(&previous, &current), Direction::Backward);
    assert_eq!(
        plan(&previous, &current, Direction::Backward),
        vec![PatchOp::InsertAtHead(&"a")]
    );
    assert_eq!(converge(&previous, &current), current);
}

#[test]
fn test_interior_replace() {
    let previous = ["a", "b", "c"];
    let current = ["a", "x", "c"];
    assert_eq!(detect(&previous, &current), Direction::Forward);
    assert_eq!(
        plan(&previous, &current, Direction::Forward),
        vec![PatchOp::Replace(1, &"x")]
    );
}

#[test]
fn test_truncation() {
    let previous = ["a", "b", "c", "d"];
    let current = ["a", "b"];
    assert_eq!(detect(&previous, &current), Direction::Forward);
    assert_eq!(
        plan(&previous, &current, Direction::Forward),
        vec![PatchOp::RemoveAt(2), PatchOp::RemoveAt(3)]
    );
    assert_eq!(converge(&previous, &current), current);
}

#[test]
fn test_prepend_with_tail_update() {
    // Head inserted and an interior row updated: still Backward because the tails match.
    let previous = ["b", "c", "z"];
    let current = ["a", "b", "x", "z"];
    assert_eq!(detect(&previous, &current), Direction::Backward);
    assert_eq!(
        plan(&previous, &current, Direction::Backward),
        vec![PatchOp::Replace(1, &"x"), PatchOp::InsertAtHead(&"a")]
    );
    assert_eq!(converge(&previous, &current), current);
}

#[test]
fn test_both_ends_changed_converges_forward() {
    let previous = ["b", "c"];
    let current = ["a", "b", "c", "d"];
    assert_eq!(detect(&previous, &current), Direction::Forward);
    assert_eq!(converge(&previous, &current), current);
}

#[test]
fn test_selection_remap_drop() {
    let previous = ["a", "b", "c"];
    let current = ["a", "c"];
    assert!(remap_selection(&BTreeSet::from([1]), &previous, &current).is_empty());
}

#[test]
fn test_selection_remap_across_prepend() {
    let previous = ["b", "c"];
    let current = ["a", "b", "c"];
    assert_eq!(
        remap_selection(&BTreeSet::from([0, 1]), &previous, &current),
        BTreeSet::from([1, 2])
    );
}
