//! Error types for the table state machine and its collaborators
#[cfg(feature = "python")]
use pyo3::{exceptions::PyValueError, PyErr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("A datasource patch is still being applied; acknowledge it before submitting another change")]
    PatchInFlight,

    #[error("Selection {selection} does not fit select mode '{mode}'")]
    SelectionModeMismatch { mode: String, selection: String },

    #[error("Row index {index} out of range for {len} rows")]
    RowOutOfRange { index: usize, len: usize },

    #[error("Header column {column} out of range for {len} columns")]
    ColumnOutOfRange { column: usize, len: usize },

    #[error("No field named '{0}'")]
    UnknownField(String),

    #[error("Template '{template}' failed: {details}")]
    TemplateError { template: String, details: String },

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// A Python value had no JSON counterpart. Only raised with the `python` feature.
    #[error("Type conversion error: expected {expected}, got {actual}")]
    TypeConversionError { expected: String, actual: String },

    /// A Python call raised. Only raised with the `python` feature.
    #[error("Python call failed: {0}")]
    PythonError(String),
}

#[cfg(feature = "python")]
impl From<TableError> for PyErr {
    fn from(err: TableError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<PyErr> for TableError {
    fn from(err: PyErr) -> Self {
        TableError::PythonError(err.to_string())
    }
}
