use thiserror::Error;

/// Errors that can occur during bridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Failed to initialize scripting bridge: {0}")]
    Initialization(String),

    #[error("Scripting bridge is not initialized")]
    NotInitialized,

    #[error("Python error: {0}")]
    Python(String),

    #[error("Failed to marshal value across the boundary: {0}")]
    Marshal(String),
}

/// Generic conversion from PyErr.
///
/// NOTE: this loses the Python traceback. Errors raised by script code that
/// the host treats as fire-and-forget are printed through the interpreter's
/// own channel instead of being converted.
impl From<pyo3::PyErr> for BridgeError {
    fn from(err: pyo3::PyErr) -> Self {
        BridgeError::Python(format!("{}", err))
    }
}
