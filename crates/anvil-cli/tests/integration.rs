//! Integration tests for the anvil CLI

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn anvil_cmd() -> Command {
    cargo_bin_cmd!("anvil")
}

#[test]
fn test_version() {
    anvil_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("anvil"));
}

#[test]
fn test_help() {
    anvil_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Python scripting"));
}

#[test]
fn test_invalid_command() {
    anvil_cmd().arg("invalid").assert().failure();
}

#[test]
fn test_exec_routes_commands_through_host() {
    anvil_cmd()
        .args(["exec", "-c", "import anvil; print(anvil.cmd('version'))"])
        .assert()
        .success()
        .stdout(predicate::str::contains("anvil 0.1.0"));
}

#[test]
fn test_run_missing_script_fails() {
    anvil_cmd()
        .args(["run", "/nonexistent/script.py"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot open script"));
}

#[test]
fn test_run_script_sees_exported_definitions() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("defs.py");
    fs::write(&script, "print('bits=%d' % ANVIL_BITS)\n").unwrap();

    anvil_cmd()
        .arg("run")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("bits=64"));
}

#[test]
fn test_plugins_lists_script_registered_plugin() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("plugin.py");
    fs::write(
        &script,
        concat!(
            "import anvil\n",
            "anvil.plugin('asm', lambda n: {\n",
            "    'name': 'cli-arch', 'arch': 'cli-arch', 'bits': 16,\n",
            "    'license': 'LGPL', 'desc': 'demo',\n",
            "    'disassemble': lambda buf: [1, 'nop'],\n",
            "})\n",
        ),
    )
    .unwrap();

    anvil_cmd()
        .arg("plugins")
        .arg("--script")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 plugin(s)"))
        .stdout(predicate::str::contains("cli-arch"));
}
