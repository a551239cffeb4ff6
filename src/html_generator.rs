//! Template engine seam and the default HTML templates
use crate::errors::TableError;
use crate::field::ContentType;
use crate::types::{SelectMode, SortOrder};
use crate::view::{PropertyData, RowData, ViewData};
use phf::phf_map;
use serde::Serialize;

// Selection input per select mode
static SELECT_INPUT_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "single" => "radio",
    "multiple" => "checkbox",
};

static SORT_ICON_CLASSES: phf::Map<&'static str, &'static str> = phf_map! {
    "asc" => "ui-icon-sort-asc",
    "desc" => "ui-icon-sort-desc",
};

pub const SORT_ICON_CLASS: &str = "ui-icon-sort";

/// Icon class for a sort label; `None` is the unsorted icon.
pub fn sort_icon_class(order: Option<SortOrder>) -> &'static str {
    order
        .and_then(|order| SORT_ICON_CLASSES.get(order.as_str()).copied())
        .unwrap_or(SORT_ICON_CLASS)
}

/// Markup for one body row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedRow {
    pub html: String,
    /// The row contains cells hosting child controls.
    pub has_ui_cells: bool,
}

/// Renders table markup. Injected into the table; there is no shared engine.
pub trait TemplateEngine {
    fn render_main(&self, view: &ViewData) -> Result<String, TableError>;
    fn render_row(&self, row: &RowData, props: &PropertyData) -> Result<String, TableError>;
    fn render_no_data(&self, props: &PropertyData) -> Result<String, TableError>;

    fn render_rendered_row(&self, row: &RowData, props: &PropertyData) -> Result<RenderedRow, TableError> {
        Ok(RenderedRow {
            html: self.render_row(row, props)?,
            has_ui_cells: row.has_ui_cells(),
        })
    }
}

impl<E: TemplateEngine + ?Sized> TemplateEngine for Box<E> {
    fn render_main(&self, view: &ViewData) -> Result<String, TableError> {
        (**self).render_main(view)
    }

    fn render_row(&self, row: &RowData, props: &PropertyData) -> Result<String, TableError> {
        (**self).render_row(row, props)
    }

    fn render_no_data(&self, props: &PropertyData) -> Result<String, TableError> {
        (**self).render_no_data(props)
    }
}

/// Consistent HTML text and attribute escaping
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// The built-in table markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTemplates;

impl HtmlTemplates {
    fn render_head(&self, props: &PropertyData) -> String {
        let helper = &props.helper;
        let mut html = String::from("<thead><tr>");

        match props.select_mode {
            SelectMode::Multiple => html.push_str(&format!(
                r#"<th class="{}"><input type="checkbox" id="{}" class="{}"></th>"#,
                helper.primary_class("head-select"),
                helper.part_id("check-all"),
                helper.primary_class("check-all"),
            )),
            SelectMode::Single => html.push_str(&format!(
                r#"<th class="{}"></th>"#,
                helper.primary_class("head-select")
            )),
            SelectMode::None => {}
        }

        for header in &props.headers {
            html.push_str(&format!(
                r#"<th class="{} {}">"#,
                helper.primary_class("head-cell"),
                header.class_name
            ));
            html.push_str(&html_escape(&header.title));
            if header.sortable {
                html.push_str(&format!(
                    r#"<span class="{} {}"></span>"#,
                    helper.primary_class("sort-label"),
                    SORT_ICON_CLASS
                ));
            }
            if let Some(tip) = &header.tip {
                html.push_str(&format!(
                    r#"<span class="{}" data-ui-type="Tip" data-ui-content="{}"></span>"#,
                    helper.primary_class("tip"),
                    html_escape(tip)
                ));
            }
            html.push_str("</th>");
        }

        html.push_str("</tr></thead>");
        html
    }
}

impl TemplateEngine for HtmlTemplates {
    fn render_main(&self, view: &ViewData) -> Result<String, TableError> {
        let props = &view.props;
        let helper = &props.helper;
        let mut html = format!(
            r#"<table id="{}" class="{}">"#,
            helper.part_id("table"),
            helper.primary_class("table")
        );
        html.push_str(&self.render_head(props));
        html.push_str("<tbody>");
        for row in &view.rows {
            html.push_str(&self.render_row(row, props)?);
        }
        html.push_str("</tbody></table>");
        if view.rows.is_empty() {
            html.push_str(&self.render_no_data(props)?);
        }
        Ok(html)
    }

    fn render_row(&self, row: &RowData, props: &PropertyData) -> Result<String, TableError> {
        let helper = &props.helper;
        let mut html = format!(r#"<tr class="{}">"#, helper.primary_class("row"));

        if let Some(input_type) = SELECT_INPUT_TYPES.get(props.select_mode.as_str()) {
            let name = if props.select_mode == SelectMode::Single {
                format!(r#" name="{}""#, helper.part_id("row-select"))
            } else {
                String::new()
            };
            html.push_str(&format!(
                r#"<td class="{}"><input type="{}" class="{}"{}></td>"#,
                helper.primary_class("row-select-cell"),
                input_type,
                helper.primary_class("row-select"),
                name
            ));
        }

        for cell in &row.cells {
            let content = match cell.content_type {
                ContentType::Text => html_escape(&cell.content),
                ContentType::Html | ContentType::Ui => cell.content.clone(),
            };
            html.push_str(&format!(r#"<td class="{}">{}</td>"#, cell.class_name, content));
        }

        html.push_str("</tr>");
        Ok(html)
    }

    fn render_no_data(&self, props: &PropertyData) -> Result<String, TableError> {
        let helper = &props.helper;
        Ok(format!(
            r#"<div id="{}" class="{}">{}</div>"#,
            helper.part_id("no-data"),
            helper.primary_class("no-data"),
            props.no_data_html
        ))
    }
}
