// Shared helpers for integration tests.
//
// Provides a temporary working directory seeded with the credential and
// dependency files, a recording executor, and a context factory so each
// integration test can set up an isolated environment without repeating
// filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use envup_cli::context::{Context, LOG_FILE, UID_FILE};
use envup_cli::exec::{ExecResult, Executor, Permission};
use envup_cli::fsutil::DEPENDENCY_FILE;
use envup_cli::platform::Platform;

/// Write the `UID` credential file and the `dependency` package list into
/// `root`.
pub fn setup_workdir(root: &Path, deps: &[&str]) {
    std::fs::write(root.join(UID_FILE), "1000\n").expect("write UID file");
    let mut listing = deps.join("\n");
    listing.push('\n');
    std::fs::write(root.join(DEPENDENCY_FILE), listing).expect("write dependency file");
}

/// Executor that records every argv and returns canned output.
///
/// Mirrors the production executor's permission handling: `Permission::User`
/// commands are recorded with their `sudo -u <username>` prefix.
#[derive(Debug)]
pub struct RecordingExecutor {
    stdout: String,
    succeed: bool,
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingExecutor {
    /// Executor whose commands succeed and produce `stdout`.
    pub fn ok(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            succeed: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Executor whose commands exit non-zero.
    pub fn fail() -> Self {
        Self {
            stdout: String::new(),
            succeed: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every recorded argv, including any permission prefix.
    pub fn recorded_calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, program: &str, args: &[&str], prefix: &[&str]) {
        let mut argv: Vec<String> = prefix.iter().map(ToString::to_string).collect();
        argv.push(program.to_string());
        argv.extend(args.iter().map(ToString::to_string));
        self.calls.lock().expect("calls lock").push(argv);
    }
}

impl Executor for RecordingExecutor {
    fn run(&self, program: &str, args: &[&str], permission: Permission) -> Result<()> {
        let prefix: &[&str] = match permission {
            Permission::User => &["sudo", "-u", "testuser"],
            Permission::Root => &[],
        };
        self.record(program, args, prefix);
        if self.succeed {
            Ok(())
        } else {
            anyhow::bail!("{program} failed (exit 1)")
        }
    }

    fn run_with_stdin(&self, program: &str, args: &[&str], _input: &str) -> Result<()> {
        self.run(program, args, Permission::Root)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        self.record(program, args, &[]);
        Ok(ExecResult {
            stdout: self.stdout.clone(),
            stderr: String::new(),
            success: self.succeed,
            code: Some(i32::from(!self.succeed)),
        })
    }

    fn which(&self, _program: &str) -> bool {
        self.succeed
    }
}

/// An isolated working directory backed by a [`tempfile::TempDir`], with a
/// ready-made [`Context`] for user `testuser` on the given platform.
pub struct IntegrationTestContext {
    pub dir: tempfile::TempDir,
    pub ctx: Context,
}

impl IntegrationTestContext {
    /// Seed a working directory with `deps` and wire `executor` into the
    /// context.
    pub fn new(platform: Platform, deps: &[&str], executor: Arc<dyn Executor>) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        setup_workdir(dir.path(), deps);
        let ctx = Context {
            origin_uid: 1000,
            username: "testuser".to_string(),
            origin_home: PathBuf::from("/home/testuser"),
            platform,
            workdir: dir.path().to_path_buf(),
            log_file: dir.path().join(LOG_FILE),
            executor,
        };
        Self { dir, ctx }
    }

    /// Path to the working directory.
    pub fn root_path(&self) -> &Path {
        self.dir.path()
    }
}
