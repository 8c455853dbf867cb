//! Script plugin registration
//!
//! Turns a script-supplied descriptor into a host plugin record and installs
//! it through the host's plugin loader. Installation is permanent for the
//! process run; only the extension-point callbacks can be rebound later.

use std::sync::Arc;

use pyo3::prelude::*;
use pyo3::types::PyDict;

use anvil_host::{AsmOp, AsmPluginRecord, PluginKind};
use anvil_logger as logger;

use crate::lifecycle::host_context;
use crate::registry::{self, ExtensionPoint};
use crate::{adapters, marshal};

/// Source name script plugins are installed under; scripts have no file
/// identity of their own by the time registration happens.
const PLUGIN_SOURCE: &str = "python.py";

/// Build and install a plugin from `factory`. Returns true on success.
///
/// Kind validation happens before any other work, so an unsupported kind or
/// a non-callable factory leaves host state untouched.
pub(crate) fn register_plugin(kind: &str, factory: &Bound<'_, PyAny>) -> bool {
    let kind = match kind.parse::<PluginKind>() {
        Ok(kind) => kind,
        Err(err) => {
            logger::warn(&format!("{}", err));
            return false;
        }
    };

    if !factory.is_callable() {
        logger::warn("plugin factory must be callable");
        return false;
    }

    let Some(host) = host_context() else {
        logger::warn("plugin registration attempted before bridge initialization");
        return false;
    };

    // The factory takes a single fixed placeholder argument; descriptor
    // factories ignore its value.
    let descriptor = match factory.call1((0,)) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            logger::script_diag(&format!("plugin factory raised: {}", err));
            return false;
        }
    };

    let descriptor = match descriptor.cast::<PyDict>() {
        Ok(descriptor) => descriptor.clone(),
        Err(_) => {
            logger::warn(&format!(
                "plugin descriptor must be a mapping, got {}",
                marshal::type_name(&descriptor)
            ));
            return false;
        }
    };

    let mut record = AsmPluginRecord {
        name: marshal::str_field(&descriptor, "name"),
        arch: marshal::str_field(&descriptor, "arch"),
        license: marshal::str_field(&descriptor, "license"),
        desc: marshal::str_field(&descriptor, "desc"),
        bits: marshal::int_field(&descriptor, "bits"),
        assemble: None,
        disassemble: None,
    };

    if let Some(callback) = marshal::callable_field(&descriptor, "disassemble") {
        registry::bind(ExtensionPoint::Disassemble, callback);
        record.disassemble = Some(Arc::new(|bytes: &[u8], op: &mut AsmOp| {
            adapters::disassemble(bytes, op)
        }));
    }
    if let Some(callback) = marshal::callable_field(&descriptor, "assemble") {
        registry::bind(ExtensionPoint::Assemble, callback);
        record.assemble = Some(Arc::new(|text: &str, op: &mut AsmOp| {
            adapters::assemble(text, op)
        }));
    }

    logger::debug(&format!(
        "installing script plugin '{}' (arch {}, {} bits)",
        record.name, record.arch, record.bits
    ));
    host.plugins.install(kind, PLUGIN_SOURCE, record);
    true
}
