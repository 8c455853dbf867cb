//! The script-visible native module
//!
//! Installed into `sys.modules` at bridge activation so scripts can
//! `import anvil` without a filesystem module existing anywhere.

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;
use pyo3::types::PyModule;

use crate::errors::BridgeError;
use crate::lifecycle::host_context;
use crate::registrar;

/// Name scripts import the bridge under.
pub const MODULE_NAME: &str = "anvil";

/// Execute a host command and return its textual output. A command that
/// produces no output returns the empty string, never None.
#[pyfunction]
fn cmd(command: &str) -> PyResult<String> {
    let Some(host) = host_context() else {
        return Err(PyRuntimeError::new_err("anvil bridge is not initialized"));
    };
    Ok(host.commands.execute(command).unwrap_or_default())
}

/// Register a plugin built from a descriptor factory. Returns True on
/// success, False for an unsupported kind or unusable factory.
#[pyfunction]
fn plugin(kind: &str, factory: Bound<'_, PyAny>) -> PyResult<bool> {
    Ok(registrar::register_plugin(kind, &factory))
}

pub(crate) fn install(py: Python<'_>) -> Result<(), BridgeError> {
    let module = PyModule::new(py, MODULE_NAME)?;
    module.add_function(wrap_pyfunction!(cmd, &module)?)?;
    module.add_function(wrap_pyfunction!(plugin, &module)?)?;

    let sys = PyModule::import(py, "sys")?;
    sys.getattr("modules")?.set_item(MODULE_NAME, module)?;
    Ok(())
}
