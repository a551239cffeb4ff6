//! Shared value types: patch operations, selection and sort state
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Direction chosen by the edge-shift detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Walk from the head; extra rows are appended or trailing rows removed.
    Forward,
    /// Walk from the tail; extra rows are prepended or leading rows removed.
    Backward,
    /// Discard rendered state and rebuild from the current rows.
    FullRebuild,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::FullRebuild => "full_rebuild",
        }
    }

    pub fn from_name(name: &str) -> Option<Direction> {
        match name {
            "forward" => Some(Direction::Forward),
            "backward" => Some(Direction::Backward),
            "full_rebuild" => Some(Direction::FullRebuild),
            _ => None,
        }
    }
}

/// Patch action tag, as reported to foreign hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchAction {
    Replace,
    InsertAtHead,
    InsertAtTail,
    Remove,
}

impl fmt::Display for PatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PatchAction::Replace => "REPLACE",
            PatchAction::InsertAtHead => "INSERT_HEAD",
            PatchAction::InsertAtTail => "INSERT_TAIL",
            PatchAction::Remove => "REMOVE",
        };
        f.write_str(name)
    }
}

/// One step of a row-list transition.
///
/// `R` is whatever the consumer carries per row: a borrowed datasource item
/// while planning, a [`RenderedRow`](crate::RenderedRow) once the template
/// engine has run. Indices of `Replace` and `RemoveAt` refer to the previous
/// row list as it was before the patch started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PatchOp<R> {
    Replace(usize, R),
    InsertAtHead(R),
    InsertAtTail(R),
    RemoveAt(usize),
}

impl<R> PatchOp<R> {
    pub fn action(&self) -> PatchAction {
        match self {
            PatchOp::Replace(..) => PatchAction::Replace,
            PatchOp::InsertAtHead(_) => PatchAction::InsertAtHead,
            PatchOp::InsertAtTail(_) => PatchAction::InsertAtTail,
            PatchOp::RemoveAt(_) => PatchAction::Remove,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            PatchOp::Replace(index, _) | PatchOp::RemoveAt(index) => Some(*index),
            PatchOp::InsertAtHead(_) | PatchOp::InsertAtTail(_) => None,
        }
    }

    pub fn item(&self) -> Option<&R> {
        match self {
            PatchOp::Replace(_, item) | PatchOp::InsertAtHead(item) | PatchOp::InsertAtTail(item) => {
                Some(item)
            }
            PatchOp::RemoveAt(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> PatchOp<U> {
        match self {
            PatchOp::Replace(index, item) => PatchOp::Replace(index, f(item)),
            PatchOp::InsertAtHead(item) => PatchOp::InsertAtHead(f(item)),
            PatchOp::InsertAtTail(item) => PatchOp::InsertAtTail(f(item)),
            PatchOp::RemoveAt(index) => PatchOp::RemoveAt(index),
        }
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(R) -> Result<U, E>) -> Result<PatchOp<U>, E> {
        Ok(match self {
            PatchOp::Replace(index, item) => PatchOp::Replace(index, f(item)?),
            PatchOp::InsertAtHead(item) => PatchOp::InsertAtHead(f(item)?),
            PatchOp::InsertAtTail(item) => PatchOp::InsertAtTail(f(item)?),
            PatchOp::RemoveAt(index) => PatchOp::RemoveAt(index),
        })
    }
}

impl<R: Clone> PatchOp<&R> {
    pub fn cloned(self) -> PatchOp<R> {
        self.map(R::clone)
    }
}

/// How rows can be selected. Fixed for the lifetime of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectMode {
    #[default]
    None,
    Single,
    Multiple,
}

impl SelectMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectMode::None => "none",
            SelectMode::Single => "single",
            SelectMode::Multiple => "multiple",
        }
    }
}

impl fmt::Display for SelectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selected rows, as indices into the current datasource.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Single(Option<usize>),
    Multiple(BTreeSet<usize>),
}

impl Selection {
    /// An empty selection for `mode`.
    pub fn empty(mode: SelectMode) -> Self {
        match mode {
            SelectMode::None => Selection::None,
            SelectMode::Single => Selection::Single(None),
            SelectMode::Multiple => Selection::Multiple(BTreeSet::new()),
        }
    }

    /// Build a selection for `mode`. Single mode keeps the lowest index.
    pub fn from_indices(mode: SelectMode, indices: BTreeSet<usize>) -> Self {
        match mode {
            SelectMode::None => Selection::None,
            SelectMode::Single => Selection::Single(indices.first().copied()),
            SelectMode::Multiple => Selection::Multiple(indices),
        }
    }

    pub fn mode(&self) -> SelectMode {
        match self {
            Selection::None => SelectMode::None,
            Selection::Single(_) => SelectMode::Single,
            Selection::Multiple(_) => SelectMode::Multiple,
        }
    }

    pub fn indices(&self) -> BTreeSet<usize> {
        match self {
            Selection::None | Selection::Single(None) => BTreeSet::new(),
            Selection::Single(Some(index)) => BTreeSet::from([*index]),
            Selection::Multiple(indices) => indices.clone(),
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        match self {
            Selection::None => false,
            Selection::Single(selected) => *selected == Some(index),
            Selection::Multiple(indices) => indices.contains(&index),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selection::None | Selection::Single(None) => true,
            Selection::Single(Some(_)) => false,
            Selection::Multiple(indices) => indices.is_empty(),
        }
    }

    /// Drop every index at or past `len`; returns the dropped indices.
    pub(crate) fn retain_below(&mut self, len: usize) -> Vec<usize> {
        match self {
            Selection::None | Selection::Single(None) => Vec::new(),
            Selection::Single(Some(index)) => {
                if *index < len {
                    Vec::new()
                } else {
                    let dropped = vec![*index];
                    *self = Selection::Single(None);
                    dropped
                }
            }
            Selection::Multiple(indices) => {
                let dropped = indices.split_off(&len);
                dropped.into_iter().collect()
            }
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::None => f.write_str("none"),
            Selection::Single(None) => f.write_str("single(-)"),
            Selection::Single(Some(index)) => write!(f, "single({})", index),
            Selection::Multiple(indices) => write!(f, "multiple({:?})", indices),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Sort state of the table. An unset `order` with a set `order_by` sorts ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    pub order_by: Option<String>,
    pub order: Option<SortOrder>,
}

impl SortState {
    pub fn by(field: impl Into<String>, order: SortOrder) -> Self {
        SortState {
            order_by: Some(field.into()),
            order: Some(order),
        }
    }

    /// The order shown on the sorted column, if any column is sorted.
    pub fn effective_order(&self) -> Option<SortOrder> {
        self.order_by
            .as_ref()
            .map(|_| self.order.unwrap_or(SortOrder::Asc))
    }

    /// The state after a click on the header of `field`.
    pub fn toggled(&self, field: &str) -> SortState {
        let is_asc = self.order_by.as_deref() == Some(field)
            && self.effective_order() == Some(SortOrder::Asc);
        let order = if is_asc { SortOrder::Desc } else { SortOrder::Asc };
        SortState::by(field, order)
    }
}

/// Generate a fresh control id
pub fn next_id() -> String {
    Uuid::new_v4().simple().to_string()
}
