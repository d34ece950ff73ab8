//! PyO3 wrapper for the simulation engine
//!
//! Compiled only with the `pyo3` feature. Python passes a plain dict using
//! the same field names as `ErConfig`; missing fields take the defaults.

use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::config::ErConfig;
use crate::orchestrator::{RunResult, SimulationEngine};

fn extract_with_default<T>(dict: &Bound<'_, PyDict>, key: &str, default: T) -> PyResult<T>
where
    T: for<'py> FromPyObject<'py>,
{
    match dict.get_item(key)? {
        Some(value) => value.extract(),
        None => Ok(default),
    }
}

/// Convert a Python dict to `ErConfig`
pub fn parse_er_config(py_config: &Bound<'_, PyDict>) -> PyResult<ErConfig> {
    let defaults = ErConfig::default();
    Ok(ErConfig {
        arrival_rate_per_hour: extract_with_default(
            py_config,
            "arrival_rate_per_hour",
            defaults.arrival_rate_per_hour,
        )?,
        service_mean_minutes: extract_with_default(
            py_config,
            "service_mean_minutes",
            defaults.service_mean_minutes,
        )?,
        num_doctors: extract_with_default(py_config, "num_doctors", defaults.num_doctors)?,
        sim_hours: extract_with_default(py_config, "sim_hours", defaults.sim_hours)?,
        random_seed: extract_with_default(py_config, "random_seed", defaults.random_seed)?,
        output_dir: extract_with_default(py_config, "output_dir", defaults.output_dir)?,
    })
}

fn run_result_to_py(py: Python<'_>, result: &RunResult) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);
    for (key, value) in result.summary.iter() {
        dict.set_item(key, value)?;
    }
    Ok(dict.unbind())
}

/// Python wrapper for `SimulationEngine`
///
/// # Example (from Python)
///
/// ```python
/// from er_simulator_core_rs import ErSimulation
///
/// sim = ErSimulation.new({"num_doctors": 2, "random_seed": 7})
/// summary = sim.run()
/// print(summary["avg_wait"], sim.config_hash())
/// ```
#[pyclass(name = "ErSimulation")]
pub struct PyErSimulation {
    inner: SimulationEngine,
}

#[pymethods]
impl PyErSimulation {
    /// Create a simulation from a config dict
    ///
    /// # Errors
    ///
    /// Raises ValueError on wrong field types, RuntimeError on invalid
    /// parameters (non-positive rates, zero doctors).
    #[staticmethod]
    fn new(config: &Bound<'_, PyDict>) -> PyResult<Self> {
        let er_config = parse_er_config(config)?;
        let inner = SimulationEngine::new(er_config.to_simulation_config()).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                "Failed to create simulation: {}",
                e
            ))
        })?;
        Ok(PyErSimulation { inner })
    }

    /// Run to the horizon and return the summary as a dict of strings
    fn run(&mut self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        let result = self.inner.run().map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("Simulation failed: {}", e))
        })?;
        run_result_to_py(py, &result)
    }

    fn config_hash(&self) -> String {
        self.inner.config_hash().to_string()
    }

    /// Current simulated minute
    fn now(&self) -> f64 {
        self.inner.now()
    }
}
