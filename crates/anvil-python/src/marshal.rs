//! Value marshalling across the script boundary
//!
//! Descriptor field readers follow the reference defaults: missing string
//! fields read as empty, a missing integer reads as zero, and missing
//! callables are simply absent. Retained callables leave this module only
//! as owned `Py<PyAny>` handles; raw borrowed references never escape.

use pyo3::prelude::*;
use pyo3::types::PyDict;

use anvil_logger as logger;

/// Read a string field from a plugin descriptor; missing or non-string
/// values yield the empty string.
pub(crate) fn str_field(descriptor: &Bound<'_, PyDict>, name: &str) -> String {
    descriptor
        .get_item(name)
        .ok()
        .flatten()
        .and_then(|v| v.extract().ok())
        .unwrap_or_default()
}

/// Read an integer field from a plugin descriptor; missing or non-integer
/// values yield zero.
pub(crate) fn int_field(descriptor: &Bound<'_, PyDict>, name: &str) -> i64 {
    descriptor
        .get_item(name)
        .ok()
        .flatten()
        .and_then(|v| v.extract().ok())
        .unwrap_or(0)
}

/// Read a callable field, retaining an owned reference. A present but
/// non-callable value is ignored with a diagnostic rather than stored.
pub(crate) fn callable_field(descriptor: &Bound<'_, PyDict>, name: &str) -> Option<Py<PyAny>> {
    let value = descriptor.get_item(name).ok().flatten()?;
    if value.is_callable() {
        Some(value.unbind())
    } else {
        logger::warn(&format!(
            "descriptor field '{}' is {}, expected a callable; ignoring",
            name,
            type_name(&value)
        ));
        None
    }
}

/// Interpret a callback result as a sequence of byte values.
pub(crate) fn byte_sequence(result: &Bound<'_, PyAny>) -> Option<Vec<u8>> {
    result.extract::<Vec<u8>>().ok()
}

/// Interpret a callback result as a `(size, text)` pair, accepting any
/// two-element indexable (list or tuple).
pub(crate) fn size_text_pair(result: &Bound<'_, PyAny>) -> Option<(i64, String)> {
    let size = result.get_item(0).ok()?.extract::<i64>().ok()?;
    let text = result.get_item(1).ok()?.extract::<String>().ok()?;
    Some((size, text))
}

/// Best-effort type name for diagnostics.
pub(crate) fn type_name(value: &Bound<'_, PyAny>) -> String {
    value
        .get_type()
        .name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "<unknown>".to_string())
}
