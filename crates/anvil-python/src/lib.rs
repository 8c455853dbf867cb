//! Embedded Python scripting bridge for the anvil tool
//!
//! This bridge covers exactly one foreign-call path in each direction:
//! the host runs script code (inline fragments or files), and scripts call
//! back into the host to execute commands (`anvil.cmd`) or register
//! assembler/disassembler plugins (`anvil.plugin`).
//!
//! One interpreter exists per process. Lifecycle and execution entries are
//! serialized behind a single bridge lock; script-to-host calls happen
//! synchronously on the same thread while that lock is held. The
//! extension-point adapters do not take that lock — the host may invoke
//! them while it is already inside the bridge on the same thread — and
//! serialize on the interpreter's own attach mechanism instead.

pub mod adapters;
pub mod errors;
mod lifecycle;
mod marshal;
pub mod registry;
mod registrar;
mod script_module;

pub use adapters::{assemble, disassemble, INVALID_MNEMONIC};
pub use errors::BridgeError;
pub use lifecycle::{Bridge, HostContext};
pub use registry::ExtensionPoint;
pub use script_module::MODULE_NAME;
