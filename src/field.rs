//! Column definitions
use crate::errors::TableError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How a cell's content is emitted into markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Plain text, escaped.
    #[default]
    Text,
    /// Trusted markup, emitted as is.
    Html,
    /// Markup hosting child controls; the host initializes them after insertion.
    Ui,
}

type ContentFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// One table column.
pub struct Field<T> {
    pub field: String,
    pub title: String,
    pub content_type: ContentType,
    pub sortable: bool,
    pub tip: Option<String>,
    content: ContentFn<T>,
}

impl<T> Field<T> {
    pub fn new(
        field: impl Into<String>,
        title: impl Into<String>,
        content: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Field {
            field: field.into(),
            title: title.into(),
            content_type: ContentType::Text,
            sortable: false,
            tip: None,
            content: Arc::new(content),
        }
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn tip(mut self, tip: impl Into<String>) -> Self {
        self.tip = Some(tip.into());
        self
    }

    pub fn content(&self, item: &T) -> String {
        (self.content)(item)
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Field {
            field: self.field.clone(),
            title: self.title.clone(),
            content_type: self.content_type,
            sortable: self.sortable,
            tip: self.tip.clone(),
            content: Arc::clone(&self.content),
        }
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("field", &self.field)
            .field("title", &self.title)
            .field("content_type", &self.content_type)
            .field("sortable", &self.sortable)
            .field("tip", &self.tip)
            .finish_non_exhaustive()
    }
}

/// Serializable column configuration for JSON rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub field: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub tip: Option<String>,
}

impl FieldSpec {
    pub fn list_from_json(json: &str) -> Result<Vec<FieldSpec>, TableError> {
        Ok(serde_json::from_str(json)?)
    }

    /// A field reading `row[field]` from JSON object rows.
    pub fn into_field(self) -> Field<serde_json::Value> {
        let key = self.field.clone();
        let mut field = Field::new(self.field, self.title, move |row: &serde_json::Value| {
            json_cell_text(row.get(&key))
        })
        .content_type(self.content_type)
        .sortable(self.sortable);
        field.tip = self.tip;
        field
    }
}

/// Text shown for a JSON cell: strings unquoted, null or missing as empty.
pub fn json_cell_text(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
