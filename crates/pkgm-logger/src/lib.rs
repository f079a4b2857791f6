//! User-facing console output
//!
//! Everything goes to stderr so that nothing is mixed into redirected
//! output. Verbosity is process-wide and set once from the CLI flags.

use colored::Colorize;
use std::sync::Mutex;

static VERBOSITY: Mutex<u8> = Mutex::new(1);

/// Verbosity levels understood by the logger
pub const QUIET: u8 = 0;
pub const NORMAL: u8 = 1;
pub const DEBUG: u8 = 2;
pub const TRACE: u8 = 3;

/// Get the current verbosity level
pub fn get_verbosity() -> u8 {
    VERBOSITY.lock().ok().map(|v| *v).unwrap_or(NORMAL)
}

/// Set the verbosity level
pub fn init(verbosity: u8) {
    if let Ok(mut v) = VERBOSITY.lock() {
        *v = verbosity;
    }
}

/// Map the verbosity level to a `tracing` filter directive
pub fn tracing_level() -> &'static str {
    match get_verbosity() {
        QUIET => "error",
        NORMAL => "warn",
        DEBUG => "debug",
        _ => "trace",
    }
}

/// Log a debug message (shown with -v)
pub fn debug(message: &str) {
    if get_verbosity() >= DEBUG {
        eprintln!("{} {}", "DEBUG:".blue().bold(), message);
    }
}

/// Log a step of the pipeline (shown with -vv)
pub fn step(message: &str) {
    if get_verbosity() >= TRACE {
        eprintln!("{} {}", "TRACE:".dimmed(), message);
    }
}

/// Log an error message (always shown)
pub fn error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

/// Log a success message (shown unless quiet)
pub fn success(message: &str) {
    if get_verbosity() >= NORMAL {
        let check = "\u{2714}".green().bold();
        eprintln!("{} {}", check, message);
    }
}
