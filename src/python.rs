//! Python module entry point
use crate::converters::{json_to_pyobject, py_list_to_rows, python_to_json};
use crate::diff_engine::DiffEngine;
use crate::table::render_json_table;
use crate::types::{Direction, PatchOp, PatchAction};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use std::collections::BTreeSet;

fn parse_direction(name: &str) -> PyResult<Direction> {
    Direction::from_name(name)
        .ok_or_else(|| PyValueError::new_err(format!("unknown direction '{}'", name)))
}

/// Direction the reconciler would pick for `previous -> current`.
#[pyfunction]
fn detect<'py>(
    py: Python<'py>,
    previous: &Bound<'py, PyAny>,
    current: &Bound<'py, PyAny>,
) -> PyResult<&'static str> {
    let previous = py_list_to_rows(py, previous)?;
    let current = py_list_to_rows(py, current)?;
    Ok(DiffEngine::new(&previous, &current).detect().as_str())
}

/// Patch operations turning `previous` into `current`, as dicts.
#[pyfunction]
#[pyo3(signature = (previous, current, direction=None))]
fn plan<'py>(
    py: Python<'py>,
    previous: &Bound<'py, PyAny>,
    current: &Bound<'py, PyAny>,
    direction: Option<String>,
) -> PyResult<Bound<'py, PyList>> {
    let previous = py_list_to_rows(py, previous)?;
    let current = py_list_to_rows(py, current)?;
    let engine = DiffEngine::new(&previous, &current);
    let direction = match direction {
        Some(name) => parse_direction(&name)?,
        None => engine.detect(),
    };

    let patches = PyList::empty(py);
    for op in engine.plan(direction) {
        let patch = PyDict::new(py);
        patch.set_item("action", op.action().to_string())?;
        patch.set_item("index", op.index())?;
        match op {
            PatchOp::Replace(_, item) | PatchOp::InsertAtHead(item) | PatchOp::InsertAtTail(item) => {
                patch.set_item("item", json_to_pyobject(py, item)?)?;
            }
            PatchOp::RemoveAt(_) => patch.set_item("item", py.None())?,
        }
        patches.append(patch)?;
    }
    Ok(patches)
}

/// Indices in `current` of the previously selected rows that still exist.
#[pyfunction]
fn remap_selection<'py>(
    py: Python<'py>,
    selected: Vec<usize>,
    previous: &Bound<'py, PyAny>,
    current: &Bound<'py, PyAny>,
) -> PyResult<Vec<usize>> {
    let previous = py_list_to_rows(py, previous)?;
    let current = py_list_to_rows(py, current)?;
    let selected: BTreeSet<usize> = selected.into_iter().collect();
    Ok(DiffEngine::new(&previous, &current)
        .remap(&selected)
        .into_iter()
        .collect())
}

/// Full table markup for `rows` with the given options and field specs.
#[pyfunction]
fn render_table<'py>(
    py: Python<'py>,
    options: &Bound<'py, PyAny>,
    fields: &Bound<'py, PyAny>,
    rows: &Bound<'py, PyAny>,
) -> PyResult<String> {
    let options = python_to_json(py, options)?;
    let fields = python_to_json(py, fields)?;
    let rows = py_list_to_rows(py, rows)?;
    Ok(render_json_table(options, fields, rows)?)
}

#[pymodule]
fn light_table(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(detect, m)?)?;
    m.add_function(wrap_pyfunction!(plan, m)?)?;
    m.add_function(wrap_pyfunction!(remap_selection, m)?)?;
    m.add_function(wrap_pyfunction!(render_table, m)?)?;

    // Export patch actions as constants
    for action in [
        PatchAction::Replace,
        PatchAction::InsertAtHead,
        PatchAction::InsertAtTail,
        PatchAction::Remove,
    ] {
        let name = action.to_string();
        m.add(name.as_str(), name.as_str())?;
    }
    Ok(())
}
