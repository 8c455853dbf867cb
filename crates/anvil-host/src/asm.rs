//! Single-instruction operation buffer shared between the host and plugins
//!
//! An [`AsmOp`] is filled in by an assembler or disassembler plugin for one
//! instruction at a time. The byte buffer has a fixed capacity; writers must
//! clamp to it, never overflow it.

/// Capacity of the per-operation byte buffer.
pub const ASM_BUF_SIZE: usize = 256;

/// Size value signalling "no result could be produced".
pub const SENTINEL_SIZE: i32 = -1;

/// One assembled or disassembled instruction.
#[derive(Clone)]
pub struct AsmOp {
    /// Consumed/produced size in bytes, or [`SENTINEL_SIZE`] on failure.
    pub size: i32,
    /// Encoded instruction bytes; only `bytes[..size]` is meaningful.
    pub bytes: [u8; ASM_BUF_SIZE],
    /// Mnemonic or source text of the instruction.
    pub text: String,
    /// Hex rendering of the instruction bytes, for display.
    pub hex: String,
}

impl Default for AsmOp {
    fn default() -> Self {
        AsmOp {
            size: 0,
            bytes: [0; ASM_BUF_SIZE],
            text: String::new(),
            hex: String::new(),
        }
    }
}

impl AsmOp {
    /// Copy `src` into the byte buffer, clamped to capacity, and refresh the
    /// hex rendering. Returns how many bytes were actually copied.
    pub fn write_bytes(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(ASM_BUF_SIZE);
        self.bytes[..n].copy_from_slice(&src[..n]);
        self.hex = to_hex(&self.bytes[..n]);
        n
    }

    /// The meaningful prefix of the byte buffer.
    pub fn encoded(&self) -> &[u8] {
        let n = usize::try_from(self.size).unwrap_or(0).min(ASM_BUF_SIZE);
        &self.bytes[..n]
    }
}

impl std::fmt::Debug for AsmOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsmOp")
            .field("size", &self.size)
            .field("text", &self.text)
            .field("hex", &self.hex)
            .finish()
    }
}

/// Render bytes as lowercase hex without separators.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        use std::fmt::Write;
        let _ = write!(out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[]), "");
        assert_eq!(to_hex(&[0x90]), "90");
        assert_eq!(to_hex(&[0x0f, 0x05]), "0f05");
    }

    #[test]
    fn test_write_bytes_clamps_to_capacity() {
        let mut op = AsmOp::default();
        let oversized = vec![0xcc; ASM_BUF_SIZE + 16];
        let copied = op.write_bytes(&oversized);
        assert_eq!(copied, ASM_BUF_SIZE);
        assert_eq!(op.hex.len(), ASM_BUF_SIZE * 2);
    }

    #[test]
    fn test_encoded_tracks_size() {
        let mut op = AsmOp::default();
        op.write_bytes(&[0x90, 0x90]);
        op.size = 2;
        assert_eq!(op.encoded(), &[0x90, 0x90]);

        op.size = SENTINEL_SIZE;
        assert!(op.encoded().is_empty());
    }
}
