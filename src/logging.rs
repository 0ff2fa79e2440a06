//! Structured logger with console output, a persistent run log and a
//! per-package summary.
//!
//! Every message is appended to the run log (`.log` in the working
//! directory) with timestamps and ANSI codes stripped, regardless of the
//! verbose flag. Internal diagnostics additionally flow through [`tracing`];
//! [`init_tracing`] wires a stderr subscriber whose filter is lowered to
//! debug by `--verbose`.

use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Mutex;

/// Result of one dispatched package handler, for summary reporting.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Package (or step) name.
    pub name: String,
    /// Final status.
    pub status: TaskStatus,
    /// Optional detail (skip reason or error description).
    pub message: Option<String>,
}

/// Status of a dispatched package handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Handler completed successfully (for probes: package present).
    Ok,
    /// Handler was filtered out by `--only`/`--skip`.
    Skipped,
    /// Probe reported the package as not installed.
    Missing,
    /// Handler returned an error.
    Failed,
}

/// Console + file logger with summary collection.
#[derive(Debug)]
pub struct Logger {
    verbose: bool,
    tasks: Mutex<Vec<TaskEntry>>,
    log_file: PathBuf,
}

/// Install a stderr `tracing` subscriber for internal diagnostics.
///
/// `RUST_LOG` overrides the default filter (`debug` with `--verbose`,
/// `warn` otherwise).
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "envup_cli=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

/// Strip ANSI escape sequences from a string.
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip until 'm' (end of SGR sequence)
            for inner in chars.by_ref() {
                if inner == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

impl Logger {
    /// Create a logger appending to `log_file` and write a run header.
    #[must_use]
    pub fn new(verbose: bool, log_file: PathBuf) -> Self {
        let logger = Self {
            verbose,
            tasks: Mutex::new(Vec::new()),
            log_file,
        };
        let version = option_env!("ENVUP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
        logger.write_to_file("INF", &format!("---- envup {version} ----"));
        logger
    }

    /// Append a timestamped line to the run log.
    fn write_to_file(&self, level: &str, msg: &str) {
        if let Ok(mut f) = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
        {
            let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            let clean = strip_ansi(msg);
            let _ = writeln!(f, "{ts} [{level}] {clean}");
        }
    }

    /// Path of the run log.
    #[must_use]
    pub const fn log_path(&self) -> &PathBuf {
        &self.log_file
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        eprintln!("\x1b[31mERROR\x1b[0m {msg}");
        self.write_to_file("ERR", msg);
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        eprintln!("\x1b[33mWARN\x1b[0m  {msg}");
        self.write_to_file("WRN", msg);
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        println!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m");
        self.write_to_file("STG", msg);
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        println!("  {msg}");
        self.write_to_file("INF", msg);
    }

    /// Log a debug message (console only when verbose; always in the file).
    pub fn debug(&self, msg: &str) {
        if self.verbose {
            println!("  \x1b[2m{msg}\x1b[0m");
        }
        self.write_to_file("DBG", msg);
    }

    /// Record a handler result for the summary.
    pub fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Number of recorded failures.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.tasks.lock().map_or(0, |tasks| {
            tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Failed)
                .count()
        })
    }

    /// Number of recorded missing probes.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.tasks.lock().map_or(0, |tasks| {
            tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Missing)
                .count()
        })
    }

    /// Whether any handler failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Clone of all recorded entries (test-only).
    #[cfg(test)]
    pub(crate) fn task_entries(&self) -> Vec<TaskEntry> {
        self.tasks.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Print the summary of all recorded handlers.
    pub fn print_summary(&self) {
        let Ok(tasks) = self.tasks.lock() else {
            return;
        };
        if tasks.is_empty() {
            return;
        }

        println!();
        println!("\x1b[1;34m==>\x1b[0m \x1b[1mSummary\x1b[0m");
        self.write_to_file("STG", "Summary");

        let mut ok = 0u32;
        let mut skipped = 0u32;
        let mut missing = 0u32;
        let mut failed = 0u32;

        for task in tasks.iter() {
            let (icon, color) = match task.status {
                TaskStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                TaskStatus::Skipped => {
                    skipped += 1;
                    ("·", "\x1b[2m")
                }
                TaskStatus::Missing => {
                    missing += 1;
                    ("○", "\x1b[33m")
                }
                TaskStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = task
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            let line = format!("{icon} {}{suffix}", task.name);
            println!("  {color}{line}\x1b[0m");
            self.write_to_file("INF", &line);
        }

        println!();
        let total = ok + skipped + missing + failed;
        let totals = format!(
            "{total} packages: {ok} ok, {skipped} skipped, {missing} missing, {failed} failed"
        );
        println!("  {totals}");
        self.write_to_file("INF", &totals);
        println!("  \x1b[2mlog: {}\x1b[0m", self.log_file.display());
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn temp_logger(verbose: bool) -> (Logger, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (Logger::new(verbose, dir.path().join(".log")), dir)
    }

    #[test]
    fn new_writes_run_header() {
        let (log, dir) = temp_logger(false);
        let contents = fs::read_to_string(dir.path().join(".log")).unwrap();
        assert!(contents.contains("envup"), "header missing: {contents}");
        drop(log);
    }

    #[test]
    fn log_file_is_append_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".log");
        let first = Logger::new(false, path.clone());
        first.info("first run");
        drop(first);
        let second = Logger::new(false, path.clone());
        second.info("second run");
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("first run"), "earlier run must survive");
        assert!(contents.contains("second run"));
    }

    #[test]
    fn messages_are_timestamped_in_file() {
        let (log, dir) = temp_logger(false);
        log.info("stamped");
        let contents = fs::read_to_string(dir.path().join(".log")).unwrap();
        let line = contents.lines().find(|l| l.contains("stamped")).unwrap();
        // "YYYY-MM-DD HH:MM:SS [INF] stamped"
        assert_eq!(&line[4..5], "-");
        assert!(line.contains("[INF]"));
    }

    #[test]
    fn debug_always_written_to_file() {
        let (log, dir) = temp_logger(false);
        log.debug("debug-marker");
        let contents = fs::read_to_string(dir.path().join(".log")).unwrap();
        assert!(contents.contains("debug-marker"));
    }

    #[test]
    fn record_task_and_counts() {
        let (log, _dir) = temp_logger(false);
        log.record_task("zsh", TaskStatus::Ok, None);
        log.record_task("git", TaskStatus::Failed, Some("apt-get exited 100"));
        log.record_task("curl", TaskStatus::Missing, None);
        log.record_task("vim", TaskStatus::Skipped, Some("filtered"));

        assert_eq!(log.failure_count(), 1);
        assert_eq!(log.missing_count(), 1);
        assert!(log.has_failures());

        let entries = log.task_entries();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[1].message, Some("apt-get exited 100".to_string()));
    }

    #[test]
    fn no_failures_initially() {
        let (log, _dir) = temp_logger(false);
        assert!(!log.has_failures());
        assert_eq!(log.failure_count(), 0);
    }

    #[test]
    fn strip_ansi_removes_colors() {
        assert_eq!(strip_ansi("\x1b[31mERROR\x1b[0m hello"), "ERROR hello");
        assert_eq!(strip_ansi("no codes here"), "no codes here");
        assert_eq!(
            strip_ansi("\x1b[1;34m==>\x1b[0m \x1b[1mstage\x1b[0m"),
            "==> stage"
        );
    }
}
