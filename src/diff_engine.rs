//! Row-list reconciler: edge-shift detection, patch planning, selection remapping
//!
//! Only two structural changes are handled incrementally: rows updated in
//! place, and rows inserted or removed at exactly one end. When both ends
//! change at once the detector still answers [`Direction::Forward`] and the
//! plan over-replaces instead of inserting. The result is still exact, just
//! less economical.
use crate::identity::{RowIdentity, ValueIdentity};
use crate::types::{Direction, PatchOp};
use log::{debug, trace, warn};
use std::collections::BTreeSet;

pub struct DiffEngine<'a, T, I = ValueIdentity> {
    previous: &'a [T],
    current: &'a [T],
    identity: I,
}

impl<'a, T: PartialEq> DiffEngine<'a, T, ValueIdentity> {
    pub fn new(previous: &'a [T], current: &'a [T]) -> Self {
        DiffEngine { previous, current, identity: ValueIdentity }
    }
}

impl<'a, T, I: RowIdentity<T>> DiffEngine<'a, T, I> {
    pub fn with_identity(previous: &'a [T], current: &'a [T], identity: I) -> Self {
        DiffEngine { previous, current, identity }
    }

    /// Classify the change by comparing the first and last rows of both snapshots.
    pub fn detect(&self) -> Direction {
        let first_same = self
            .identity
            .same_opt(self.previous.first(), self.current.first());
        let last_same = self
            .identity
            .same_opt(self.previous.last(), self.current.last());

        if !first_same && last_same {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }

    /// Emit the patch sequence turning `previous` into `current` for `direction`.
    pub fn plan(&self, direction: Direction) -> Vec<PatchOp<&'a T>> {
        let ops = match direction {
            Direction::Forward => self.plan_forward(),
            Direction::Backward => self.plan_backward(),
            Direction::FullRebuild => Vec::new(),
        };
        debug!(
            "DiffEngine: {:?} plan, {} -> {} rows, {} ops",
            direction,
            self.previous.len(),
            self.current.len(),
            ops.len()
        );
        ops
    }

    /// Detect the direction and plan in one step.
    pub fn reconcile(&self) -> (Direction, Vec<PatchOp<&'a T>>) {
        let direction = self.detect();
        (direction, self.plan(direction))
    }

    fn plan_forward(&self) -> Vec<PatchOp<&'a T>> {
        let (previous, current) = (self.previous, self.current);
        let shared = previous.len().min(current.len());
        let mut ops = Vec::new();

        for (i, (old, new)) in previous.iter().zip(current).enumerate() {
            if !self.identity.same(old, new) {
                trace!("DiffEngine: replace row {}", i);
                ops.push(PatchOp::Replace(i, new));
            }
        }

        if current.len() > previous.len() {
            ops.extend(current[shared..].iter().map(PatchOp::InsertAtTail));
        } else {
            ops.extend((shared..previous.len()).map(PatchOp::RemoveAt));
        }
        ops
    }

    fn plan_backward(&self) -> Vec<PatchOp<&'a T>> {
        let (previous, current) = (self.previous, self.current);
        let mut ops = Vec::new();

        for (i, (old, new)) in previous.iter().rev().zip(current.iter().rev()).enumerate() {
            if !self.identity.same(old, new) {
                let previous_index = previous.len() - 1 - i;
                trace!("DiffEngine: replace row {} (from tail)", previous_index);
                ops.push(PatchOp::Replace(previous_index, new));
            }
        }

        if current.len() > previous.len() {
            // Inserting the leading slice back to front leaves it in order.
            let leading = &current[..current.len() - previous.len()];
            ops.extend(leading.iter().rev().map(PatchOp::InsertAtHead));
        } else {
            ops.extend((0..previous.len() - current.len()).map(PatchOp::RemoveAt));
        }
        ops
    }

    /// Carry selected rows over to `current`.
    ///
    /// Indices past the end of `previous` are dropped, as are rows that no
    /// longer exist in `current`. A row present more than once maps to its
    /// first occurrence.
    pub fn remap(&self, selected: &BTreeSet<usize>) -> BTreeSet<usize> {
        let mut remapped = BTreeSet::new();
        for &index in selected {
            let Some(item) = self.previous.get(index) else {
                warn!(
                    "DiffEngine: selected index {} out of range for {} rows, dropped",
                    index,
                    self.previous.len()
                );
                continue;
            };
            match self.identity.position(self.current, item) {
                Some(new_index) => {
                    remapped.insert(new_index);
                }
                None => debug!("DiffEngine: selected row {} vanished, selection dropped", index),
            }
        }
        remapped
    }
}

pub fn detect<T: PartialEq>(previous: &[T], current: &[T]) -> Direction {
    DiffEngine::new(previous, current).detect()
}

pub fn plan<'a, T: PartialEq>(
    previous: &'a [T],
    current: &'a [T],
    direction: Direction,
) -> Vec<PatchOp<&'a T>> {
    DiffEngine::new(previous, current).plan(direction)
}

pub fn remap_selection<T: PartialEq>(
    selected: &BTreeSet<usize>,
    previous: &[T],
    current: &[T],
) -> BTreeSet<usize> {
    DiffEngine::new(previous, current).remap(selected)
}

/// Apply a patch sequence to a materialized row list, in emitted order.
///
/// Each contiguous run of `RemoveAt` is applied from the highest index down,
/// so the indices keep referring to the list as it was before the run.
pub fn apply_patches<R>(rows: &mut Vec<R>, ops: impl IntoIterator<Item = PatchOp<R>>) {
    let mut removals: Vec<usize> = Vec::new();

    for op in ops {
        if let PatchOp::RemoveAt(index) = op {
            removals.push(index);
            continue;
        }
        flush_removals(rows, &mut removals);

        match op {
            PatchOp::Replace(index, row) => match rows.get_mut(index) {
                Some(slot) => *slot = row,
                None => warn!("apply_patches: replace at {} past {} rows ignored", index, rows.len()),
            },
            PatchOp::InsertAtHead(row) => rows.insert(0, row),
            PatchOp::InsertAtTail(row) => rows.push(row),
            PatchOp::RemoveAt(_) => {}
        }
    }
    flush_removals(rows, &mut removals);
}

fn flush_removals<R>(rows: &mut Vec<R>, removals: &mut Vec<usize>) {
    if removals.is_empty() {
        return;
    }
    removals.sort_unstable_by(|a, b| b.cmp(a));
    removals.dedup();
    for index in removals.drain(..) {
        if index < rows.len() {
            rows.remove(index);
        } else {
            warn!("apply_patches: remove at {} past {} rows ignored", index, rows.len());
        }
    }
}
