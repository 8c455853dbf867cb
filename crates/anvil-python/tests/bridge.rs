//! End-to-end bridge tests
//!
//! The embedded interpreter and the bridge are process-global, so every
//! test here shares one bridge instance and serializes on TEST_LOCK. Each
//! test sets up its own callback bindings before asserting.

use std::ffi::CString;
use std::fs;
use std::sync::{Arc, Mutex, OnceLock};

use pyo3::prelude::*;
use tempfile::TempDir;

use anvil_host::{
    AsmOp, CommandExecutor, Definition, OpenSandbox, PluginKind, PluginRegistry, SENTINEL_SIZE,
};
use anvil_python::{registry, Bridge, ExtensionPoint, HostContext, INVALID_MNEMONIC};

struct StubExecutor;

impl CommandExecutor for StubExecutor {
    fn execute(&self, command: &str) -> Option<String> {
        match command {
            "version" => Some("anvil 0.1.0".to_string()),
            cmd => cmd.strip_prefix("echo ").map(str::to_string),
        }
    }
}

struct Fixture {
    bridge: &'static Bridge,
    plugins: Arc<PluginRegistry>,
}

static FIXTURE: OnceLock<Fixture> = OnceLock::new();
static TEST_LOCK: Mutex<()> = Mutex::new(());

fn fixture() -> &'static Fixture {
    FIXTURE.get_or_init(|| {
        let plugins = Arc::new(PluginRegistry::new());
        let ctx = Arc::new(HostContext {
            commands: Arc::new(StubExecutor),
            fs: Arc::new(OpenSandbox),
            plugins: plugins.clone(),
        });
        let bridge = Bridge::initialize(ctx).expect("bridge activation failed");
        Fixture { bridge, plugins }
    })
}

fn eval_str(code: &str) -> String {
    Python::attach(|py| {
        let code = CString::new(code).unwrap();
        py.eval(code.as_c_str(), None, None)
            .unwrap()
            .extract()
            .unwrap()
    })
}

fn eval_bool(code: &str) -> bool {
    Python::attach(|py| {
        let code = CString::new(code).unwrap();
        py.eval(code.as_c_str(), None, None)
            .unwrap()
            .extract()
            .unwrap()
    })
}

fn eval_i64(code: &str) -> i64 {
    Python::attach(|py| {
        let code = CString::new(code).unwrap();
        py.eval(code.as_c_str(), None, None)
            .unwrap()
            .extract()
            .unwrap()
    })
}

#[test]
fn test_initialize_is_idempotent() {
    let _guard = TEST_LOCK.lock().unwrap();
    let fx = fixture();

    // A second activation with a different host context is a no-op.
    let other = Arc::new(HostContext {
        commands: Arc::new(StubExecutor),
        fs: Arc::new(OpenSandbox),
        plugins: Arc::new(PluginRegistry::new()),
    });
    let again = Bridge::initialize(other).unwrap();
    assert!(std::ptr::eq(fx.bridge, again));
    assert!(std::ptr::eq(fx.bridge, Bridge::get().unwrap()));

    // Commands still route through the first context's executor.
    assert_eq!(
        eval_str("__import__('anvil').cmd('version')"),
        "anvil 0.1.0"
    );
}

#[test]
fn test_cmd_normalizes_missing_output_to_empty_string() {
    let _guard = TEST_LOCK.lock().unwrap();
    fixture();

    assert_eq!(eval_str("__import__('anvil').cmd('someSilentCommand')"), "");
    assert_eq!(eval_str("__import__('anvil').cmd('echo hi')"), "hi");
}

#[test]
fn test_unsupported_plugin_kind_is_rejected() {
    let _guard = TEST_LOCK.lock().unwrap();
    let fx = fixture();

    let before = fx.plugins.installed_count();
    assert!(!eval_bool(
        "__import__('anvil').plugin('elf', lambda n: {})"
    ));
    assert_eq!(fx.plugins.installed_count(), before);
}

#[test]
fn test_non_callable_factory_is_rejected() {
    let _guard = TEST_LOCK.lock().unwrap();
    let fx = fixture();

    let before = fx.plugins.installed_count();
    assert!(!eval_bool("__import__('anvil').plugin('asm', 42)"));
    assert_eq!(fx.plugins.installed_count(), before);
}

#[test]
fn test_definitions_bind_as_script_globals() {
    let _guard = TEST_LOCK.lock().unwrap();
    let fx = fixture();

    fx.bridge
        .prepare_environment(&[Definition::int("x", 42), Definition::str("s", "hi")])
        .unwrap();

    assert_eq!(eval_i64("x"), 42);
    assert_eq!(eval_str("s"), "hi");

    // Last write wins per name.
    fx.bridge
        .prepare_environment(&[Definition::int("x", 7)])
        .unwrap();
    assert_eq!(eval_i64("x"), 7);
}

#[test]
fn test_assemble_without_callback_returns_sentinel() {
    let _guard = TEST_LOCK.lock().unwrap();
    fixture();

    registry::unbind(ExtensionPoint::Assemble);
    let mut op = AsmOp::default();
    assert_eq!(anvil_python::assemble("nop", &mut op), SENTINEL_SIZE);
    // Output buffer untouched.
    assert_eq!(op.size, 0);
    assert!(op.hex.is_empty());
    assert!(op.text.is_empty());
}

#[test]
fn test_disassemble_without_callback_reports_invalid() {
    let _guard = TEST_LOCK.lock().unwrap();
    fixture();

    registry::unbind(ExtensionPoint::Disassemble);
    let mut op = AsmOp::default();
    assert_eq!(anvil_python::disassemble(&[0x90], &mut op), SENTINEL_SIZE);
    assert_eq!(op.size, SENTINEL_SIZE);
    assert_eq!(op.text, INVALID_MNEMONIC);
}

#[test]
fn test_registered_plugin_disassembles_through_callback() {
    let _guard = TEST_LOCK.lock().unwrap();
    let fx = fixture();

    fx.bridge
        .execute_inline(concat!(
            "import anvil\n",
            "def _dis_factory(n):\n",
            "    return {\n",
            "        'name': 'pydis',\n",
            "        'arch': 'pydis',\n",
            "        'license': 'LGPL',\n",
            "        'desc': 'test disassembler',\n",
            "        'bits': 32,\n",
            "        'disassemble': lambda buf: [1, 'nop'],\n",
            "    }\n",
            "_dis_ok = anvil.plugin('asm', _dis_factory)\n",
        ))
        .unwrap();
    assert!(eval_bool("_dis_ok"));

    let installed = fx.plugins.find("pydis").unwrap();
    assert_eq!(installed.kind, PluginKind::Asm);
    assert_eq!(installed.source, "python.py");
    assert_eq!(installed.record.bits, 32);
    assert!(installed.record.assemble.is_none());

    let mut op = AsmOp::default();
    assert_eq!(installed.record.disassemble(&[0x90], &mut op), 1);
    assert_eq!(op.size, 1);
    assert_eq!(op.text, "nop");
    assert_eq!(op.hex, "90");
}

#[test]
fn test_rebinding_assemble_overwrites_previous_callback() {
    let _guard = TEST_LOCK.lock().unwrap();
    let fx = fixture();

    fx.bridge
        .execute_inline(concat!(
            "import anvil\n",
            "anvil.plugin('asm', lambda n: {'name': 'asm1', 'assemble': lambda s: [0x90]})\n",
            "anvil.plugin('asm', lambda n: {'name': 'asm2', 'assemble': lambda s: [0xcc, 0xcc]})\n",
        ))
        .unwrap();
    assert!(registry::is_bound(ExtensionPoint::Assemble));

    let mut op = AsmOp::default();
    assert_eq!(anvil_python::assemble("int3", &mut op), 2);
    assert_eq!(op.hex, "cccc");
    assert_eq!(op.text, "int3");
}

#[test]
fn test_malformed_disassemble_result_degrades() {
    let _guard = TEST_LOCK.lock().unwrap();
    let fx = fixture();

    fx.bridge
        .execute_inline(concat!(
            "import anvil\n",
            "anvil.plugin('asm', lambda n: {'name': 'bad', 'disassemble': lambda buf: 5})\n",
        ))
        .unwrap();

    let mut op = AsmOp::default();
    assert_eq!(anvil_python::disassemble(&[0x90], &mut op), SENTINEL_SIZE);
    assert_eq!(op.text, INVALID_MNEMONIC);
}

#[test]
fn test_malformed_assemble_result_degrades() {
    let _guard = TEST_LOCK.lock().unwrap();
    let fx = fixture();

    fx.bridge
        .execute_inline(concat!(
            "import anvil\n",
            "anvil.plugin('asm', lambda n: {'name': 'badasm', 'assemble': lambda s: 'xx'})\n",
        ))
        .unwrap();

    let mut op = AsmOp::default();
    assert_eq!(anvil_python::assemble("nop", &mut op), SENTINEL_SIZE);
    // Output buffer untouched on a non-sequence result.
    assert_eq!(op.size, 0);
    assert!(op.hex.is_empty());
    assert!(op.text.is_empty());
}

#[test]
fn test_disassemble_size_clamped_to_window() {
    let _guard = TEST_LOCK.lock().unwrap();
    let fx = fixture();

    fx.bridge
        .execute_inline(concat!(
            "import anvil\n",
            "anvil.plugin('asm', lambda n: {'name': 'greedy', 'disassemble': lambda buf: [99, 'nop']})\n",
        ))
        .unwrap();

    let mut op = AsmOp::default();
    assert_eq!(anvil_python::disassemble(&[0x90, 0x90], &mut op), 2);
    assert_eq!(op.size, 2);
    assert_eq!(op.hex, "9090");
    assert_eq!(op.encoded(), &[0x90, 0x90]);
}

#[test]
fn test_execute_file_runs_script_and_fails_on_missing_path() {
    let _guard = TEST_LOCK.lock().unwrap();
    let fx = fixture();

    let dir = TempDir::new().unwrap();
    let script = dir.path().join("script.py");
    fs::write(&script, "file_ran = 1234\n").unwrap();

    assert!(fx.bridge.execute_file(&script));
    assert_eq!(eval_i64("file_ran"), 1234);

    assert!(!fx.bridge.execute_file(&dir.path().join("missing.py")));
}

#[test]
fn test_inline_script_errors_stay_on_interpreter_channel() {
    let _guard = TEST_LOCK.lock().unwrap();
    let fx = fixture();

    // Fire and forget: an uncaught script error is not a host error.
    assert!(fx.bridge.execute_inline("raise ValueError('boom')").is_ok());
}
