//! Host collaborators: command execution and sandboxed script file access

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Executes one host command string and captures its textual output.
///
/// `None` means the command produced no output; the bridge normalizes that
/// to an empty string before it crosses the boundary.
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, command: &str) -> Option<String>;
}

/// Sandboxed read access to script files.
pub trait SandboxedFs: Send + Sync {
    /// Open `path` and return its contents, or an error if the sandbox
    /// policy rejects the path or the read fails.
    fn open(&self, path: &Path) -> io::Result<String>;
}

/// Unconfined sandbox: any readable path is allowed.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenSandbox;

impl SandboxedFs for OpenSandbox {
    fn open(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// Sandbox confined to a directory tree. Paths are canonicalized before the
/// prefix check so `..` segments cannot escape the root.
#[derive(Debug, Clone)]
pub struct RootedSandbox {
    root: PathBuf,
}

impl RootedSandbox {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into().canonicalize()?;
        Ok(RootedSandbox { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SandboxedFs for RootedSandbox {
    fn open(&self, path: &Path) -> io::Result<String> {
        let resolved = path.canonicalize()?;
        if !resolved.starts_with(&self.root) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("path outside sandbox root: {}", path.display()),
            ));
        }
        fs::read_to_string(resolved)
    }
}
