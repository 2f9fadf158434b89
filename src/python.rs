use crate::model::ProjectBundle;
use crate::projection::{CyclePolicy, Projector};
use crate::walker::{StageVolumes, compute_stage_volumes};
use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

/// A funnel project loaded for projection.
///
/// The project JSON is parsed (and migrated from older schema versions) once
/// on construction; `project` and `stage_volumes` can then be called repeatedly.
#[pyclass(name = "Funnel")]
struct FunnelPy {
    bundle: ProjectBundle,
}

#[pymethods]
impl FunnelPy {
    /// Loads a project.
    ///
    /// Args:
    ///     bundle_json (str): A JSON document with `stages`, `edges`, `cohorts`
    ///         and `opportunities` arrays, bare or inside a `{"state", "version"}`
    ///         envelope.
    ///
    /// Raises:
    ///     ValueError: If the JSON is malformed or its schema version is unsupported.
    #[new]
    fn new(bundle_json: &str) -> PyResult<Self> {
        let bundle = ProjectBundle::from_json(bundle_json)
            .map_err(|e| PyErr::new::<PyValueError, _>(e.to_string()))?;
        Ok(FunnelPy { bundle })
    }

    /// Projects every cohort under the enabled opportunities.
    ///
    /// Args:
    ///     strict (bool): Raise instead of truncating when the funnel has a cycle.
    ///
    /// Returns:
    ///     str: The projection report as JSON, with `results` and `blended` keys.
    ///
    /// Raises:
    ///     RuntimeError: If `strict` is set and the funnel contains a cycle.
    #[pyo3(signature = (strict = false))]
    fn project(&self, strict: bool) -> PyResult<String> {
        let policy = if strict {
            CyclePolicy::Reject
        } else {
            CyclePolicy::Truncate
        };
        let report = Projector::builder(&self.bundle)
            .cycle_policy(policy)
            .build()
            .project()
            .map_err(|e| PyErr::new::<PyRuntimeError, _>(e.to_string()))?;
        serde_json::to_string(&report).map_err(|e| PyErr::new::<PyRuntimeError, _>(e.to_string()))
    }

    /// Baseline volume at every stage for one cohort.
    ///
    /// Raises:
    ///     KeyError: If no cohort has the given id.
    fn stage_volumes(&self, cohort_id: &str) -> PyResult<StageVolumes> {
        let cohort = self
            .bundle
            .cohort(cohort_id)
            .ok_or_else(|| PyErr::new::<PyKeyError, _>(cohort_id.to_string()))?;
        Ok(compute_stage_volumes(
            &self.bundle.stages,
            &self.bundle.transitions,
            cohort,
        ))
    }

    /// Total entry volume of one cohort.
    fn total_entry_volume(&self, cohort_id: &str) -> PyResult<f64> {
        self.bundle
            .cohort(cohort_id)
            .map(|c| c.total_entry_volume())
            .ok_or_else(|| PyErr::new::<PyKeyError, _>(cohort_id.to_string()))
    }
}

/// Conversion funnel projections.
///
/// Python bindings to the funnelcast Rust library.
#[pymodule]
fn funnelcast(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<FunnelPy>()?;
    Ok(())
}
