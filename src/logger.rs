//! Logging utilities with colored output and progress display.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro, only shown with `--verbose`
//! - `ProgressLine` for single-line progress display over a batch of files
//!
//! Messages logged under the `error` and `warn` modules go to stderr, which is
//! the diagnostic channel for failed transforms. Everything else goes to stdout
//! unless `set_stderr_only` reserves stdout for command output.
//!
//! # Example
//!
//! ```ignore
//! log!("script"; "compiled {} files", count);
//! log!("error"; "{}", err);
//!
//! let progress = ProgressLine::new("transform", 12);
//! progress.inc();
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stderr, stdout},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Send every message to stderr (stdout carries command output)
static STDERR_ONLY: AtomicBool = AtomicBool::new(false);

/// Route all log output to stderr, keeping stdout free for results
pub fn set_stderr_only(v: bool) {
    STDERR_ONLY.store(v, Ordering::SeqCst);
}

/// Whether a progress line currently owns the last stdout line.
static BAR_ACTIVE: AtomicBool = AtomicBool::new(false);

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    if writes_to_stderr(&module_lower) {
        let mut stderr = stderr().lock();
        writeln!(stderr, "{prefix} {message}").ok();
        stderr.flush().ok();
        return;
    }

    let mut stdout = stdout().lock();
    if BAR_ACTIVE.load(Ordering::SeqCst) {
        // Overwrite the progress line, it is redrawn on the next tick
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
    }
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Modules routed to stderr
#[inline]
fn is_diagnostic(module_lower: &str) -> bool {
    matches!(module_lower, "error" | "warn")
}

#[inline]
fn writes_to_stderr(module_lower: &str) -> bool {
    is_diagnostic(module_lower) || STDERR_ONLY.load(Ordering::SeqCst)
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "script" => prefix.bright_blue().bold().to_string(),
        "style" => prefix.bright_magenta().bold().to_string(),
        "pipeline" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Progress Line (single-line counter)
// ============================================================================

/// Single-line progress display for a batch of files
///
/// Displays: `[transform] 5/12 (1 failed)`
///
/// Updates in place on the same line. Uses `try_lock` so a busy display
/// skips the refresh instead of blocking.
pub struct ProgressLine {
    label: &'static str,
    total: usize,
    current: AtomicUsize,
    failed: AtomicUsize,
    lock: Mutex<()>,
}

impl ProgressLine {
    /// Create and draw a new progress line.
    pub fn new(label: &'static str, total: usize) -> Self {
        BAR_ACTIVE.store(true, Ordering::SeqCst);
        let progress = Self {
            label,
            total,
            current: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            lock: Mutex::new(()),
        };
        progress.display();
        progress
    }

    /// Count one processed file.
    #[inline]
    pub fn inc(&self) {
        self.current.fetch_add(1, Ordering::Relaxed);
        if self.lock.try_lock().is_some() {
            self.display();
        }
    }

    /// Count one processed file that failed.
    #[inline]
    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.inc();
    }

    fn line(&self) -> String {
        let current = self.current.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let prefix = colorize_prefix(self.label, self.label);
        if failed == 0 {
            format!("{prefix} {current}/{}", self.total)
        } else {
            format!(
                "{prefix} {current}/{} ({})",
                self.total,
                format!("{failed} failed").red()
            )
        }
    }

    fn display(&self) {
        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        write!(stdout, "{}", self.line()).ok();
        stdout.flush().ok();
    }

    /// Finish progress display, preserve line and move to next line.
    pub fn finish(self) {
        BAR_ACTIVE.store(false, Ordering::SeqCst);
        {
            let _guard = self.lock.lock();
            let mut stdout = stdout().lock();
            execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
            writeln!(stdout, "{}", self.line()).ok();
            stdout.flush().ok();
        }
        std::mem::forget(self); // Prevent Drop from clearing
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        BAR_ACTIVE.store(false, Ordering::SeqCst);

        // Clear the line on drop (if not finished properly)
        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        stdout.flush().ok();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_modules() {
        assert!(is_diagnostic("error"));
        assert!(is_diagnostic("warn"));
        assert!(!is_diagnostic("script"));
        assert!(!is_diagnostic("style"));
    }

    #[test]
    fn test_stderr_only_routes_everything() {
        set_stderr_only(true);
        assert!(writes_to_stderr("script"));
        assert!(writes_to_stderr("pipeline"));
        set_stderr_only(false);
        assert!(!writes_to_stderr("script"));
        assert!(writes_to_stderr("error"));
    }

    #[test]
    fn test_prefix_contains_module() {
        owo_colors::set_override(false);
        assert_eq!(colorize_prefix("Script", "script"), "[Script]");
        assert_eq!(colorize_prefix("other", "other"), "[other]");
    }

    #[test]
    fn test_verbose_toggle() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }
}
