//! Python <-> JSON conversion for the Python bindings
use crate::errors::TableError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList, PyModule};

/// Convert a Python list to JSON rows
pub fn py_list_to_rows<'py>(
    py: Python<'py>,
    obj: &Bound<'py, PyAny>,
) -> Result<Vec<serde_json::Value>, TableError> {
    match python_to_json(py, obj)? {
        serde_json::Value::Array(rows) => Ok(rows),
        other => Err(TableError::TypeConversionError {
            expected: "list".into(),
            actual: format!("value is not a list (was {})", other),
        }),
    }
}

/// Convert Python object to JSON via the `json` module
pub fn python_to_json<'py>(
    py: Python<'py>,
    obj: &Bound<'py, PyAny>,
) -> Result<serde_json::Value, TableError> {
    let json_mod = PyModule::import(py, "json")?;
    let dumps = json_mod.getattr("dumps")?;
    let dumped = dumps.call1((obj,))?;
    let s: String = dumped.extract()?;
    serde_json::from_str(&s).map_err(|e| TableError::TypeConversionError {
        expected: "JSON-serializable type".into(),
        actual: e.to_string(),
    })
}

/// Convert JSON back to Python with proper type mapping
pub fn json_to_pyobject<'py>(
    py: Python<'py>,
    value: &serde_json::Value,
) -> PyResult<Bound<'py, PyAny>> {
    match value {
        serde_json::Value::Null => Ok(py.None().into_bound(py).into_any()),
        serde_json::Value::Bool(b) => Ok((*b).into_pyobject(py)?.to_owned().into_any()),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.into_pyobject(py)?.into_any())
            } else if let Some(f) = n.as_f64() {
                Ok(f.into_pyobject(py)?.into_any())
            } else {
                Ok(n.to_string().into_pyobject(py)?.into_any())
            }
        }
        serde_json::Value::String(s) => Ok(s.as_str().into_pyobject(py)?.into_any()),
        serde_json::Value::Array(arr) => {
            let list = PyList::empty(py);
            for v in arr {
                list.append(json_to_pyobject(py, v)?)?;
            }
            Ok(list.into_any())
        }
        serde_json::Value::Object(map) => {
            let dict = PyDict::new(py);
            for (k, v) in map {
                dict.set_item(k, json_to_pyobject(py, v)?)?;
            }
            Ok(dict.into_any())
        }
    }
}
