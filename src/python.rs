//! Python module entry point, built with the `python` feature
use crate::batch::{CommitResult, EditBatch, EditStep};
use crate::config::{MoveRewriteGate, ReconcilerConfig};
use crate::errors::ReconcilerError;
use crate::reconciler::ChangeSetReconciler;
use crate::types::{ChangeKind, IndexPath};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use std::sync::{Arc, Mutex, MutexGuard};

#[pyclass(name = "Reconciler")]
pub struct PyReconciler {
    inner: Arc<Mutex<ChangeSetReconciler>>,
}

#[pymethods]
impl PyReconciler {
    #[new]
    #[pyo3(signature = (move_rewrite=None, filter_subsumed_items=true))]
    fn new(move_rewrite: Option<String>, filter_subsumed_items: bool) -> PyResult<Self> {
        let mut config = ReconcilerConfig::default().with_filter_subsumed_items(filter_subsumed_items);
        if let Some(gate) = move_rewrite {
            let gate: MoveRewriteGate = serde_json::from_value(serde_json::Value::String(gate))
                .map_err(ReconcilerError::from)?;
            config = config.with_move_rewrite(gate);
        }
        log::debug!("Reconciler: initialized from Python with {:?}", config);

        Ok(PyReconciler {
            inner: Arc::new(Mutex::new(ChangeSetReconciler::with_config(config))),
        })
    }

    fn begin_cycle(&self) -> PyResult<()> {
        self.lock()?.begin_cycle();
        Ok(())
    }

    /// `kind` is a name ("insert") or a raw feed code (1).
    fn record_section_change(&self, index: usize, kind: &Bound<'_, PyAny>) -> PyResult<()> {
        let kind = extract_kind(kind)?;
        Ok(self.lock()?.record_section_change(index, kind)?)
    }

    #[pyo3(signature = (kind, source=None, target=None))]
    fn record_item_change(
        &self,
        kind: &Bound<'_, PyAny>,
        source: Option<(usize, usize)>,
        target: Option<(usize, usize)>,
    ) -> PyResult<()> {
        let kind = extract_kind(kind)?;
        Ok(self.lock()?.record_item_change(kind, source.map(IndexPath::from), target.map(IndexPath::from))?)
    }

    fn commit<'py>(&self, py: Python<'py>, is_container_attached: bool) -> PyResult<Bound<'py, PyAny>> {
        let result = self.lock()?.commit(is_container_attached);
        commit_result_to_python(py, &result)
    }

    fn discard(&self) -> PyResult<()> {
        self.lock()?.discard();
        Ok(())
    }

    fn is_cycle_open(&self) -> PyResult<bool> {
        Ok(self.lock()?.is_cycle_open())
    }
}

impl PyReconciler {
    fn lock(&self) -> Result<MutexGuard<'_, ChangeSetReconciler>, ReconcilerError> {
        self.inner
            .lock()
            .map_err(|e| ReconcilerError::LockPoisoned(e.to_string()))
    }
}

fn extract_kind(kind: &Bound<'_, PyAny>) -> PyResult<ChangeKind> {
    if let Ok(code) = kind.extract::<u64>() {
        return Ok(ChangeKind::from_raw(code)?);
    }
    let name: String = kind.extract()?;
    Ok(name.parse::<ChangeKind>()?)
}

fn path_tuple(path: &IndexPath) -> (usize, usize) {
    (path.section, path.row)
}

fn paths_list<'py>(py: Python<'py>, paths: &[IndexPath]) -> PyResult<Bound<'py, PyList>> {
    PyList::new(py, paths.iter().map(path_tuple))
}

fn step_to_python<'py>(py: Python<'py>, step: &EditStep) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    match step {
        EditStep::DeleteSections(sections) => {
            dict.set_item("action", "DELETE_SECTIONS")?;
            dict.set_item("targets", sections.clone())?;
        }
        EditStep::InsertSections(sections) => {
            dict.set_item("action", "INSERT_SECTIONS")?;
            dict.set_item("targets", sections.clone())?;
        }
        EditStep::DeleteItems(paths) => {
            dict.set_item("action", "DELETE_ITEMS")?;
            dict.set_item("targets", paths_list(py, paths)?)?;
        }
        EditStep::InsertItems(paths) => {
            dict.set_item("action", "INSERT_ITEMS")?;
            dict.set_item("targets", paths_list(py, paths)?)?;
        }
        EditStep::ReloadItems(paths) => {
            dict.set_item("action", "RELOAD_ITEMS")?;
            dict.set_item("targets", paths_list(py, paths)?)?;
        }
    }
    Ok(dict)
}

fn batch_to_python<'py>(py: Python<'py>, batch: &EditBatch) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("action", "BATCH")?;
    dict.set_item("deleted_sections", batch.deleted_sections.iter().copied().collect::<Vec<_>>())?;
    dict.set_item("inserted_sections", batch.inserted_sections.iter().copied().collect::<Vec<_>>())?;
    dict.set_item("deleted_items", paths_list(py, &batch.deleted_items)?)?;
    dict.set_item("inserted_items", paths_list(py, &batch.inserted_items)?)?;
    dict.set_item("reloaded_items", paths_list(py, &batch.reloaded_items)?)?;

    let moves = PyList::empty(py);
    for item_move in &batch.moves {
        moves.append((path_tuple(&item_move.from), path_tuple(&item_move.to)))?;
    }
    dict.set_item("moves", moves)?;

    let steps = PyList::empty(py);
    for step in batch.steps() {
        steps.append(step_to_python(py, &step)?)?;
    }
    dict.set_item("steps", steps)?;

    Ok(dict)
}

fn commit_result_to_python<'py>(py: Python<'py>, result: &CommitResult) -> PyResult<Bound<'py, PyAny>> {
    match result {
        CommitResult::Batch(batch) => Ok(batch_to_python(py, batch)?.into_any()),
        CommitResult::Reload => {
            let dict = PyDict::new(py);
            dict.set_item("action", "RELOAD")?;
            Ok(dict.into_any())
        }
    }
}

#[pymodule]
fn collection_reconciler(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyReconciler>()?;

    // Change kind names accepted by record_* calls
    m.add("INSERT", ChangeKind::Insert.as_str())?;
    m.add("DELETE", ChangeKind::Delete.as_str())?;
    m.add("UPDATE", ChangeKind::Update.as_str())?;
    m.add("MOVE", ChangeKind::Move.as_str())?;

    Ok(())
}
