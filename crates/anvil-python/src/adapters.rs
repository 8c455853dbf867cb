//! Extension-point adapters called by the host
//!
//! Each adapter bridges one host entry point to the currently bound script
//! callback. A script error or a malformed result never crosses back into
//! the host: the adapter logs a diagnostic and degrades to the sentinel
//! size, because a wrong single-instruction result is recoverable where a
//! crash inside the host's analysis loop is not.

use pyo3::prelude::*;
use pyo3::types::PyBytes;

use anvil_host::{AsmOp, SENTINEL_SIZE};
use anvil_logger as logger;

use crate::marshal;
use crate::registry::{self, ExtensionPoint};

/// Placeholder mnemonic when disassembly cannot produce one.
pub const INVALID_MNEMONIC: &str = "invalid";

/// Assemble one instruction through the bound script callback.
///
/// Returns the encoded byte count, clamped to the op buffer capacity, or
/// [`SENTINEL_SIZE`] if no callback is bound or the result is unusable.
/// `op` is left untouched unless encoding succeeds.
pub fn assemble(text: &str, op: &mut AsmOp) -> i32 {
    Python::attach(|py| {
        let Some(callback) = registry::lookup(py, ExtensionPoint::Assemble) else {
            return SENTINEL_SIZE;
        };

        let result = match callback.bind(py).call1((text,)) {
            Ok(result) => result,
            Err(err) => {
                logger::script_diag(&format!("assemble callback raised: {}", err));
                return SENTINEL_SIZE;
            }
        };

        let Some(bytes) = marshal::byte_sequence(&result) else {
            logger::warn(&format!(
                "assemble callback returned {}, expected a sequence of byte values",
                marshal::type_name(&result)
            ));
            return SENTINEL_SIZE;
        };

        let copied = op.write_bytes(&bytes);
        if copied < bytes.len() {
            logger::warn(&format!(
                "assemble result for '{}' truncated from {} to {} bytes",
                text,
                bytes.len(),
                copied
            ));
        }
        op.size = copied as i32;
        op.text = text.to_string();
        op.size
    })
}

/// Disassemble one instruction from `bytes` through the bound callback.
///
/// The callback receives the raw byte window and must return a
/// `(consumed_size, mnemonic)` pair; a claimed size beyond the window is
/// clamped to it. On any failure the op carries the sentinel size and the
/// placeholder mnemonic.
pub fn disassemble(bytes: &[u8], op: &mut AsmOp) -> i32 {
    Python::attach(|py| {
        let Some(callback) = registry::lookup(py, ExtensionPoint::Disassemble) else {
            return degrade(op);
        };

        let window = PyBytes::new(py, bytes);
        let result = match callback.bind(py).call1((window,)) {
            Ok(result) => result,
            Err(err) => {
                logger::script_diag(&format!("disassemble callback raised: {}", err));
                return degrade(op);
            }
        };

        let Some((consumed, mnemonic)) = marshal::size_text_pair(&result) else {
            logger::warn(&format!(
                "disassemble callback returned {}, expected a (size, mnemonic) pair",
                marshal::type_name(&result)
            ));
            return degrade(op);
        };

        // The consumed size and the rendered window are both clamped to
        // what the host actually handed us, so `op.size` never exceeds the
        // buffered prefix. Negative claims pass through as failure sizes.
        if consumed > bytes.len() as i64 {
            logger::warn(&format!(
                "disassemble callback claimed {} bytes for a {}-byte window; clamping",
                consumed,
                bytes.len()
            ));
        }
        let window_len = usize::try_from(consumed).unwrap_or(0).min(bytes.len());
        op.write_bytes(&bytes[..window_len]);
        op.size = consumed.min(bytes.len() as i64) as i32;
        op.text = mnemonic;
        op.size
    })
}

fn degrade(op: &mut AsmOp) -> i32 {
    op.size = SENTINEL_SIZE;
    op.text = INVALID_MNEMONIC.to_string();
    SENTINEL_SIZE
}
