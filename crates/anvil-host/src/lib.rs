//! Host-side model for the anvil scripting bridge
//!
//! The scripting bridge talks to the rest of the tool exclusively through
//! the traits defined here: command execution, sandboxed script file access,
//! and plugin installation. The types in this crate are interpreter-agnostic;
//! nothing here depends on the embedded runtime.

pub mod asm;
pub mod defs;
pub mod exec;
pub mod plugin;

pub use asm::{to_hex, AsmOp, ASM_BUF_SIZE, SENTINEL_SIZE};
pub use defs::{DefValue, Definition};
pub use exec::{CommandExecutor, OpenSandbox, RootedSandbox, SandboxedFs};
pub use plugin::{
    AsmPluginRecord, AssembleFn, DisassembleFn, InstalledPlugin, KindError, PluginKind,
    PluginLoader, PluginRegistry,
};
