//! Bridge lifecycle: interpreter start-up, environment preparation, and
//! the host-side execution entry points
//!
//! The interpreter is process-global, so the bridge is a singleton. A second
//! `initialize` call is a deliberate no-op returning the existing instance,
//! not an error; the host context recorded by the first activation stays in
//! effect. Teardown is best-effort only: embedded interpreters are commonly
//! never finalized, and this bridge does not try to.
//!
//! Known limitation: `execute_inline` and `execute_file` have no timeout or
//! cancellation hook. A script that never returns blocks the calling host
//! thread indefinitely.

use std::ffi::CString;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use once_cell::sync::OnceCell;
use pyo3::prelude::*;

use anvil_host::{CommandExecutor, DefValue, Definition, PluginLoader, SandboxedFs};
use anvil_logger as logger;

use crate::errors::BridgeError;
use crate::script_module;

/// Host collaborators handed to the bridge at activation time. The native
/// module's entry points resolve back to this same context.
pub struct HostContext {
    pub commands: Arc<dyn CommandExecutor>,
    pub fs: Arc<dyn SandboxedFs>,
    pub plugins: Arc<dyn PluginLoader>,
}

/// Helper modules pre-imported by `prepare_environment`; absence of any of
/// them is not an error.
const PRELUDE_IMPORTS: &[&str] = &["anvilpipe", "anvil"];

pub struct Bridge {
    host: Arc<HostContext>,
}

static BRIDGE_INSTANCE: OnceCell<Result<Bridge, BridgeError>> = OnceCell::new();
static HOST_CONTEXT: OnceCell<Arc<HostContext>> = OnceCell::new();
static BOUNDARY: Mutex<()> = Mutex::new(());

/// Serialize entry into the interpreter. Script-to-host calls re-enter the
/// host on the same thread while this guard is held, so the native module
/// entry points must never take it themselves.
fn boundary_entry() -> MutexGuard<'static, ()> {
    match BOUNDARY.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// The host context recorded at activation, for the script-to-host path.
pub(crate) fn host_context() -> Option<Arc<HostContext>> {
    HOST_CONTEXT.get().cloned()
}

impl Bridge {
    /// Start the interpreter and activate the bridge, or return the already
    /// active instance. Idempotent: a repeat call ignores `host` and is a
    /// no-op.
    pub fn initialize(host: Arc<HostContext>) -> Result<&'static Bridge, BridgeError> {
        match BRIDGE_INSTANCE.get_or_init(|| Bridge::activate(host)) {
            Ok(bridge) => Ok(bridge),
            Err(e) => Err(BridgeError::Initialization(format!("{}", e))),
        }
    }

    /// Get the active bridge.
    pub fn get() -> Result<&'static Bridge, BridgeError> {
        match BRIDGE_INSTANCE.get() {
            Some(Ok(bridge)) => Ok(bridge),
            Some(Err(e)) => Err(BridgeError::Initialization(format!("{}", e))),
            None => Err(BridgeError::NotInitialized),
        }
    }

    fn activate(host: Arc<HostContext>) -> Result<Bridge, BridgeError> {
        let _entry = boundary_entry();
        let start = Instant::now();

        // Record the host handle before the native module becomes importable
        // so script-to-host calls always find it.
        HOST_CONTEXT.set(host.clone()).map_err(|_| {
            BridgeError::Initialization("host context already recorded".to_string())
        })?;

        pyo3::Python::initialize();
        pyo3::Python::attach(script_module::install)?;

        logger::debug(&format!(
            "scripting bridge activated in {:?}",
            start.elapsed()
        ));
        Ok(Bridge { host })
    }

    /// Best-effort teardown hint. The interpreter is left running; process
    /// exit is the real teardown.
    pub fn shutdown_hint(&self) {
        logger::debug("bridge shutdown hint received; interpreter left running");
    }

    /// Run the prelude and bind the host's exported definitions as script
    /// globals. Safe to call repeatedly; the last binding per name wins.
    pub fn prepare_environment(&self, definitions: &[Definition]) -> Result<(), BridgeError> {
        let _entry = boundary_entry();
        Python::attach(|py| {
            for module in PRELUDE_IMPORTS {
                let guarded = format!("try:\n    import {}\nexcept ImportError:\n    pass\n", module);
                if let Ok(code) = CString::new(guarded) {
                    if let Err(err) = py.run(code.as_c_str(), None, None) {
                        err.print(py);
                    }
                }
            }

            for def in definitions {
                let stmt = binding_statement(def);
                logger::step(&format!("binding script global: {}", stmt));
                let code = CString::new(stmt).map_err(|_| {
                    BridgeError::Marshal(format!("definition '{}' contains NUL", def.name))
                })?;
                if let Err(err) = py.run(code.as_c_str(), None, None) {
                    err.print(py);
                }
            }
            Ok(())
        })
    }

    /// Run a code fragment synchronously on the calling thread. Uncaught
    /// script errors are reported through the interpreter's own channel and
    /// never surface as a host error.
    pub fn execute_inline(&self, code: &str) -> Result<(), BridgeError> {
        let _entry = boundary_entry();
        let code = CString::new(code)
            .map_err(|_| BridgeError::Marshal("code fragment contains NUL".to_string()))?;
        Python::attach(|py| {
            if let Err(err) = py.run(code.as_c_str(), None, None) {
                err.print(py);
            }
        });
        Ok(())
    }

    /// Open `path` through the host's sandbox and run its contents. Returns
    /// false if the file cannot be opened; whether the script itself
    /// succeeded is not reported.
    pub fn execute_file(&self, path: &Path) -> bool {
        let source = match self.host.fs.open(path) {
            Ok(source) => source,
            Err(e) => {
                logger::debug(&format!("cannot open script {}: {}", path.display(), e));
                return false;
            }
        };
        self.execute_inline(&source).is_ok()
    }

    /// Hand control to an interactive shell, if the companion pipe module
    /// and IPython are importable. Best-effort; returns false when
    /// unavailable.
    pub fn interactive_prompt(&self) -> bool {
        let _entry = boundary_entry();
        let snippet = concat!(
            "conn = None\n",
            "try:\n",
            "    import anvil\n",
            "    import anvilpipe\n",
            "    conn = anvilpipe.open()\n",
            "    import IPython\n",
            "    IPython.embed()\n",
            "except Exception:\n",
            "    raise Exception(\"Cannot find IPython\")\n",
        );
        Python::attach(|py| {
            let Ok(code) = CString::new(snippet) else {
                return false;
            };
            match py.run(code.as_c_str(), None, None) {
                Ok(()) => true,
                Err(err) => {
                    err.print(py);
                    false
                }
            }
        })
    }
}

/// Binding rule per semantic type: ints literally, strings quoted, opaque
/// handles through the script-side cast-from-address helper of their type.
fn binding_statement(def: &Definition) -> String {
    match &def.value {
        DefValue::Int(v) => format!("{} = {}", def.name, v),
        DefValue::Str(s) => format!("{} = \"{}\"", def.name, escape_str(s)),
        DefValue::Handle { type_name, addr } => {
            format!("{} = {}.ncast({:#x})", def.name, type_name, addr)
        }
    }
}

fn escape_str(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_definition_binds_literally() {
        let def = Definition::int("bits", 64);
        assert_eq!(binding_statement(&def), "bits = 64");
    }

    #[test]
    fn test_string_definition_binds_quoted() {
        let def = Definition::str("arch", "x86");
        assert_eq!(binding_statement(&def), "arch = \"x86\"");
    }

    #[test]
    fn test_string_definition_escapes_quotes() {
        let def = Definition::str("s", "say \"hi\"\n");
        assert_eq!(binding_statement(&def), "s = \"say \\\"hi\\\"\\n\"");
    }

    #[test]
    fn test_handle_definition_binds_through_cast_helper() {
        let def = Definition::handle("core", "AnvilCore", 0xdead_beef);
        assert_eq!(binding_statement(&def), "core = AnvilCore.ncast(0xdeadbeef)");
    }
}
