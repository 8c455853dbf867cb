//! Logging for the anvil tool and its scripting bridge
//!
//! Messages always go to the log file; verbosity controls what reaches the
//! console. The bridge tags script-originated diagnostics with a SCRIPT
//! source so boundary problems are easy to spot in one file.

use colored::Colorize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

static LOG_FILE: Mutex<Option<PathBuf>> = Mutex::new(None);
static VERBOSITY: Mutex<u8> = Mutex::new(0);
static ECHO_SCRIPT: Mutex<bool> = Mutex::new(false);

/// Get the current verbosity level (0 = warnings, 1 = debug, 2 = trace).
pub fn get_verbosity() -> u8 {
    VERBOSITY.lock().ok().map(|v| *v).unwrap_or(0)
}

/// Whether script-side diagnostics are echoed to the console.
pub fn get_echo_script() -> bool {
    ECHO_SCRIPT.lock().ok().map(|v| *v).unwrap_or(false)
}

/// Enable or disable console echo of script-side diagnostics.
pub fn set_echo_script(enabled: bool) {
    if let Ok(mut v) = ECHO_SCRIPT.lock() {
        *v = enabled;
    }
}

/// Initialize the logger with a verbosity level and the script-echo flag.
pub fn init_with_verbosity(verbosity: u8, echo_script: bool) -> Result<(), String> {
    if let Ok(mut v) = VERBOSITY.lock() {
        *v = verbosity;
    }
    set_echo_script(echo_script);
    init()
}

fn init() -> Result<(), String> {
    let config_dir = get_config_dir()?;
    fs::create_dir_all(&config_dir)
        .map_err(|e| format!("Failed to create config directory: {}", e))?;

    let log_file = config_dir.join("anvil.log");

    // Truncate on each run
    if log_file.exists() {
        let _ = fs::remove_file(&log_file);
    }

    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = Some(log_file);
    }

    Ok(())
}

fn get_config_dir() -> Result<PathBuf, String> {
    #[cfg(not(target_os = "windows"))]
    let config_dir = dirs::home_dir()
        .ok_or("Could not determine home directory")?
        .join(".config")
        .join("anvil");

    #[cfg(target_os = "windows")]
    let config_dir = dirs::config_dir()
        .ok_or("Could not determine config directory")?
        .join("anvil");

    Ok(config_dir)
}

fn write_to_log(message: &str) {
    write_to_log_with_source(message, "HOST");
}

fn write_to_log_with_source(message: &str, source: &str) {
    if let Ok(guard) = LOG_FILE.lock() {
        if let Some(ref log_path) = *guard {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_path) {
                let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                let _ = writeln!(file, "[{}] [{}] {}", timestamp, source, message);
            }
        }
    }
}

/// Log an informational message (console if verbose >= 1, always to file).
pub fn info(message: &str) {
    write_to_log(&format!("INFO {}", message));
    if get_verbosity() >= 1 {
        eprintln!("{}", message);
    }
}

/// Log a debug message (console if verbose >= 1, always to file).
pub fn debug(message: &str) {
    write_to_log(&format!("DEBUG {}", message));
    if get_verbosity() >= 1 {
        eprintln!("{} {}", "DEBUG:".blue().bold(), message);
    }
}

/// Log a warning (both file and console).
pub fn warn(message: &str) {
    write_to_log(&format!("WARN {}", message));
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}

/// Log an error (both file and console).
pub fn error(message: &str) {
    write_to_log(&format!("ERROR {}", message));
    eprintln!("{} {}", "Error:".red().bold(), message);
}

/// Log a trace-level step (console only at -vv, always to file).
pub fn step(message: &str) {
    if get_verbosity() >= 2 {
        eprintln!("TRACE: {}", message);
    }
    write_to_log(&format!("STEP: {}", message));
}

/// Log a diagnostic originating on the script side of the boundary.
pub fn script_diag(message: &str) {
    write_to_log_with_source(message, "SCRIPT");
    if get_echo_script() {
        eprintln!("{} {}", "script:".magenta().bold(), message);
    }
}

/// Get the log file path for display.
pub fn get_log_path() -> Option<PathBuf> {
    LOG_FILE.lock().ok().and_then(|guard| guard.clone())
}

/// Get the log file path as a string, falling back to the default location.
pub fn get_log_path_string() -> String {
    if let Some(path) = get_log_path() {
        path.to_string_lossy().to_string()
    } else if let Ok(config_dir) = get_config_dir() {
        config_dir.join("anvil.log").to_string_lossy().to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_script_toggle() {
        set_echo_script(true);
        assert!(get_echo_script());
        set_echo_script(false);
        assert!(!get_echo_script());
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn test_messages_reach_log_file() {
        let home = tempfile::TempDir::new().unwrap();
        std::env::set_var("HOME", home.path());

        init_with_verbosity(0, false).unwrap();
        warn("boundary fault");
        script_diag("callback raised");

        let contents = fs::read_to_string(get_log_path().unwrap()).unwrap();
        assert!(contents.contains("[HOST] WARN boundary fault"));
        assert!(contents.contains("[SCRIPT] callback raised"));
    }
}
