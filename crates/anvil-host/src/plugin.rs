//! Plugin records and the loader interface
//!
//! A script registers a plugin by handing the bridge a descriptor; the
//! bridge turns it into an [`AsmPluginRecord`] whose entry points are thin
//! adapter closures, then installs the record through a [`PluginLoader`].
//! Installation is permanent for the process run.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::asm::{AsmOp, SENTINEL_SIZE};

/// Supported plugin kinds. Only assembler/disassembler plugins exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    Asm,
}

impl PluginKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PluginKind::Asm => "asm",
        }
    }
}

#[derive(Error, Debug)]
pub enum KindError {
    #[error("unsupported plugin kind: '{0}' (only 'asm' is supported)")]
    Unsupported(String),
}

impl FromStr for PluginKind {
    type Err = KindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asm" => Ok(PluginKind::Asm),
            other => Err(KindError::Unsupported(other.to_string())),
        }
    }
}

/// Assemble one instruction: source text in, encoded bytes into `op`.
/// Returns the byte count, or [`SENTINEL_SIZE`] on failure.
pub type AssembleFn = Arc<dyn Fn(&str, &mut AsmOp) -> i32 + Send + Sync>;

/// Disassemble one instruction from a byte window into `op`.
/// Returns the consumed byte count, or [`SENTINEL_SIZE`] on failure.
pub type DisassembleFn = Arc<dyn Fn(&[u8], &mut AsmOp) -> i32 + Send + Sync>;

/// Host-native plugin record built from a script-supplied descriptor.
#[derive(Clone, Default)]
pub struct AsmPluginRecord {
    pub name: String,
    pub arch: String,
    pub license: String,
    pub desc: String,
    pub bits: i64,
    pub assemble: Option<AssembleFn>,
    pub disassemble: Option<DisassembleFn>,
}

impl AsmPluginRecord {
    /// Dispatch to the assemble entry point, if the plugin provides one.
    pub fn assemble(&self, text: &str, op: &mut AsmOp) -> i32 {
        match &self.assemble {
            Some(f) => f(text, op),
            None => SENTINEL_SIZE,
        }
    }

    /// Dispatch to the disassemble entry point, if the plugin provides one.
    pub fn disassemble(&self, bytes: &[u8], op: &mut AsmOp) -> i32 {
        match &self.disassemble {
            Some(f) => f(bytes, op),
            None => SENTINEL_SIZE,
        }
    }
}

impl fmt::Debug for AsmPluginRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsmPluginRecord")
            .field("name", &self.name)
            .field("arch", &self.arch)
            .field("license", &self.license)
            .field("desc", &self.desc)
            .field("bits", &self.bits)
            .field("assemble", &self.assemble.is_some())
            .field("disassemble", &self.disassemble.is_some())
            .finish()
    }
}

/// Installs a finished plugin record into host state.
///
/// The bridge relinquishes ownership of the record here; there is no
/// uninstall within the same process run.
pub trait PluginLoader: Send + Sync {
    fn install(&self, kind: PluginKind, source: &str, record: AsmPluginRecord);
}

/// One installed plugin, as kept by [`PluginRegistry`].
#[derive(Debug, Clone)]
pub struct InstalledPlugin {
    pub kind: PluginKind,
    pub source: String,
    pub record: AsmPluginRecord,
}

/// In-process plugin registry; the reference [`PluginLoader`] implementation.
#[derive(Default)]
pub struct PluginRegistry {
    inner: Mutex<Vec<InstalledPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        PluginRegistry::default()
    }

    pub fn installed_count(&self) -> usize {
        self.inner.lock().map(|v| v.len()).unwrap_or(0)
    }

    /// Look up an installed plugin by record name.
    pub fn find(&self, name: &str) -> Option<InstalledPlugin> {
        self.inner
            .lock()
            .ok()?
            .iter()
            .find(|p| p.record.name == name)
            .cloned()
    }

    /// The most recently installed plugin, if any.
    pub fn last(&self) -> Option<InstalledPlugin> {
        self.inner.lock().ok()?.last().cloned()
    }
}

impl PluginLoader for PluginRegistry {
    fn install(&self, kind: PluginKind, source: &str, record: AsmPluginRecord) {
        if let Ok(mut plugins) = self.inner.lock() {
            plugins.push(InstalledPlugin {
                kind,
                source: source.to_string(),
                record,
            });
        }
    }
}
