//! Retained script callbacks bound to host extension points
//!
//! Each extension point holds at most one callback; binding again replaces
//! the previous one and releases its retained reference. Bound callbacks
//! are otherwise kept alive for the remainder of the process, which is the
//! intended lifetime: installed plugins cannot be uninstalled. `unbind`
//! exists so a host can drop a callback early, but nothing requires it.

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::OnceCell;
use pyo3::prelude::*;

use anvil_logger as logger;

/// Named slots the host exposes for scripts to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionPoint {
    Assemble,
    Disassemble,
}

impl ExtensionPoint {
    pub fn name(self) -> &'static str {
        match self {
            ExtensionPoint::Assemble => "assemble",
            ExtensionPoint::Disassemble => "disassemble",
        }
    }
}

static CALLBACKS: OnceCell<Mutex<HashMap<ExtensionPoint, Py<PyAny>>>> = OnceCell::new();

fn table() -> &'static Mutex<HashMap<ExtensionPoint, Py<PyAny>>> {
    CALLBACKS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Retain `callback` for `point`, replacing any earlier binding.
pub(crate) fn bind(point: ExtensionPoint, callback: Py<PyAny>) {
    if let Ok(mut callbacks) = table().lock() {
        if callbacks.insert(point, callback).is_some() {
            logger::debug(&format!(
                "replaced previously bound '{}' callback",
                point.name()
            ));
        }
    }
}

/// Clone the currently bound callback for `point`, if any.
pub(crate) fn lookup(py: Python<'_>, point: ExtensionPoint) -> Option<Py<PyAny>> {
    table()
        .lock()
        .ok()?
        .get(&point)
        .map(|callback| callback.clone_ref(py))
}

/// Whether a callback is currently bound to `point`.
pub fn is_bound(point: ExtensionPoint) -> bool {
    table()
        .lock()
        .map(|callbacks| callbacks.contains_key(&point))
        .unwrap_or(false)
}

/// Release the callback bound to `point`. Returns whether one was bound.
pub fn unbind(point: ExtensionPoint) -> bool {
    table()
        .lock()
        .map(|mut callbacks| callbacks.remove(&point).is_some())
        .unwrap_or(false)
}
