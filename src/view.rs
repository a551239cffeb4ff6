//! View data handed to the template engine
use crate::field::{ContentType, Field};
use crate::types::SelectMode;
use serde::Serialize;

/// Builds class names and element ids for one table control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlHelper {
    id: String,
    class_prefix: String,
}

impl ControlHelper {
    pub fn new(id: impl Into<String>, class_prefix: impl Into<String>) -> Self {
        ControlHelper {
            id: id.into(),
            class_prefix: class_prefix.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn class_prefix(&self) -> &str {
        &self.class_prefix
    }

    /// `{class prefix}-{part}`
    pub fn primary_class(&self, part: &str) -> String {
        format!("{}-{}", self.class_prefix, part)
    }

    /// `ctrl-{id}-{part}`
    pub fn part_id(&self, part: &str) -> String {
        format!("ctrl-{}-{}", self.id, part)
    }
}

/// `createTime` -> `create-time`
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderData {
    pub field: String,
    pub title: String,
    pub sortable: bool,
    pub tip: Option<String>,
    pub class_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    pub field: String,
    pub content: String,
    pub content_type: ContentType,
    pub class_name: String,
}

/// Cells of one row, one per field in column order. Fields may share a name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RowData {
    pub cells: Vec<CellData>,
}

impl RowData {
    pub fn has_ui_cells(&self) -> bool {
        self.cells
            .iter()
            .any(|cell| cell.content_type == ContentType::Ui)
    }
}

/// Table-wide properties every template sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyData {
    pub helper: ControlHelper,
    pub select_mode: SelectMode,
    pub no_data_html: String,
    pub headers: Vec<HeaderData>,
    pub row_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewData {
    #[serde(flatten)]
    pub props: PropertyData,
    pub rows: Vec<RowData>,
}

pub fn compute_headers<T>(fields: &[Field<T>], helper: &ControlHelper) -> Vec<HeaderData> {
    fields
        .iter()
        .map(|field| HeaderData {
            field: field.field.clone(),
            title: field.title.clone(),
            sortable: field.sortable,
            tip: field.tip.clone(),
            class_name: helper.primary_class(&format!("head-cell-for-{}", kebab_case(&field.field))),
        })
        .collect()
}

pub fn compute_row_data<T>(fields: &[Field<T>], item: &T, helper: &ControlHelper) -> RowData {
    let ui_class = helper.primary_class("cell-ui");
    let cells = fields
        .iter()
        .map(|field| {
            let mut class_name =
                helper.primary_class(&format!("cell-for-{}", kebab_case(&field.field)));
            if field.content_type == ContentType::Ui {
                class_name.push(' ');
                class_name.push_str(&ui_class);
            }
            CellData {
                field: field.field.clone(),
                content: field.content(item),
                content_type: field.content_type,
                class_name,
            }
        })
        .collect();
    RowData { cells }
}
