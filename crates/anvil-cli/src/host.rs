//! Demo host collaborators for the CLI
//!
//! The real analysis engine is out of scope here; this executor implements
//! just enough commands to drive scripts end to end, and installed plugins
//! land in an in-process registry.

use anvil_host::{to_hex, CommandExecutor, Definition, PluginRegistry};
use std::sync::Arc;

/// Minimal command executor: version query, echo, and hex rendering of
/// space-separated byte values. Unknown commands are silent.
pub struct DemoExecutor;

impl CommandExecutor for DemoExecutor {
    fn execute(&self, command: &str) -> Option<String> {
        if command == "version" {
            return Some(format!("anvil {}", env!("CARGO_PKG_VERSION")));
        }
        if let Some(rest) = command.strip_prefix("echo ") {
            return Some(rest.to_string());
        }
        if let Some(rest) = command.strip_prefix("hex ") {
            let bytes: Vec<u8> = rest
                .split_whitespace()
                .filter_map(|tok| tok.parse().ok())
                .collect();
            return Some(to_hex(&bytes));
        }
        None
    }
}

/// Definitions exported into the script global namespace at start-up.
pub fn definitions() -> Vec<Definition> {
    vec![
        Definition::str("ANVIL_VERSION", env!("CARGO_PKG_VERSION")),
        Definition::int("ANVIL_BITS", 64),
    ]
}

pub struct DemoHost {
    pub plugins: Arc<PluginRegistry>,
}

impl DemoHost {
    pub fn new() -> Self {
        DemoHost {
            plugins: Arc::new(PluginRegistry::new()),
        }
    }
}
