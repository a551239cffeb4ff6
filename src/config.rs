//! Table options, loadable from JSON with every key defaulted
use crate::errors::TableError;
use crate::types::{next_id, SelectMode, Selection, SortOrder, SortState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_UI_CLASS_PREFIX: &str = "ui";
pub const DEFAULT_NO_DATA_HTML: &str = "没有内容";

/// `selectedIndex` as written in options: a scalar in single mode, a list otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectedIndex {
    One(usize),
    Many(Vec<usize>),
}

impl Default for SelectedIndex {
    fn default() -> Self {
        SelectedIndex::Many(Vec::new())
    }
}

impl SelectedIndex {
    pub fn into_selection(self, mode: SelectMode) -> Result<Selection, TableError> {
        match (mode, self) {
            (SelectMode::None, SelectedIndex::Many(indices)) if indices.is_empty() => {
                Ok(Selection::None)
            }
            (SelectMode::Single, SelectedIndex::One(index)) => Ok(Selection::Single(Some(index))),
            (SelectMode::Single, SelectedIndex::Many(indices)) if indices.len() <= 1 => {
                Ok(Selection::Single(indices.first().copied()))
            }
            (SelectMode::Multiple, SelectedIndex::Many(indices)) => {
                Ok(Selection::Multiple(indices.into_iter().collect::<BTreeSet<_>>()))
            }
            (mode, other) => Err(TableError::SelectionModeMismatch {
                mode: mode.to_string(),
                selection: format!("{:?}", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableOptions {
    pub id: String,
    pub ui_class_prefix: String,
    pub select_mode: SelectMode,
    pub selected_index: SelectedIndex,
    pub order: Option<SortOrder>,
    pub order_by: Option<String>,
    #[serde(rename = "noDataHTML")]
    pub no_data_html: String,
    /// Patch the body on datasource changes instead of re-rendering it.
    pub incremental: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            id: next_id(),
            ui_class_prefix: DEFAULT_UI_CLASS_PREFIX.to_string(),
            select_mode: SelectMode::None,
            selected_index: SelectedIndex::default(),
            order: None,
            order_by: None,
            no_data_html: DEFAULT_NO_DATA_HTML.to_string(),
            incremental: true,
        }
    }
}

impl TableOptions {
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn select_mode(mut self, mode: SelectMode) -> Self {
        self.select_mode = mode;
        self
    }

    pub fn incremental(mut self, incremental: bool) -> Self {
        self.incremental = incremental;
        self
    }

    pub fn sort(&self) -> SortState {
        SortState {
            order_by: self.order_by.clone(),
            order: self.order,
        }
    }

    /// `{ui class prefix}-light-table`
    pub fn class_prefix(&self) -> String {
        format!("{}-light-table", self.ui_class_prefix)
    }
}
