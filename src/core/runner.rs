//! Single-flight external command execution.
//!
//! A [`CommandRunner`] launches at most one external command line at a time on
//! a background thread and hands the captured result to a completion handler.
//! A request made while another command is still running is dropped, not
//! queued; callers must not expect a retry.
//!
//! No timeout is imposed. A hung command keeps the slot occupied until it
//! exits, which delays every later poll and action.

use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::SystemTime;

/// One external command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub argv: Vec<String>,
    pub started_at: SystemTime,
}

/// Outcome of one command.
///
/// `exit_code` is `None` when the process never produced an exit code
/// (launch failure or killed by a signal); `output` then carries a
/// human-readable error instead of captured text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: Option<i32>,
    pub output: String,
    pub completed_normally: bool,
}

impl CommandResult {
    /// Process ran and exited with `code`.
    #[must_use]
    pub fn exited(code: i32, output: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            output: output.into(),
            completed_normally: true,
        }
    }

    /// Process could not be launched or did not exit on its own.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            exit_code: None,
            output: error.into(),
            completed_normally: false,
        }
    }

    /// Exited normally with status 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.completed_normally && self.exit_code == Some(0)
    }

    /// Short description for logs, e.g. `exit 3` or `launch failed: ...`.
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.completed_normally, self.exit_code) {
            (true, Some(code)) => format!("exit {code}"),
            _ => format!("failed: {}", self.output.trim()),
        }
    }
}

/// Runs one command line to completion, blocking the calling thread.
///
/// This is the seam between the runner and the operating system; tests
/// substitute scripted launchers.
pub trait ProcessLauncher: Send + Sync {
    fn launch(&self, argv: &[String]) -> CommandResult;
}

/// Launches real processes through `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, argv: &[String]) -> CommandResult {
        let Some((program, args)) = argv.split_first() else {
            return CommandResult::failed("empty command line");
        };

        let output = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
        {
            Ok(output) => output,
            Err(e) => return CommandResult::failed(format!("{program}: {e}")),
        };

        // stdout first, then stderr; both streams end up in one blob.
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        match output.status.code() {
            Some(code) => CommandResult::exited(code, text),
            None => CommandResult::failed(describe_abnormal_exit(program, output.status)),
        }
    }
}

#[cfg(unix)]
fn describe_abnormal_exit(program: &str, status: std::process::ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(signal) => format!("{program}: terminated by signal {signal}"),
        None => format!("{program}: exited abnormally"),
    }
}

#[cfg(not(unix))]
fn describe_abnormal_exit(program: &str, _status: std::process::ExitStatus) -> String {
    format!("{program}: exited abnormally")
}

/// Single-flight command executor.
///
/// Cloning shares the same slot, so every clone observes the same
/// in-flight command.
#[derive(Clone)]
pub struct CommandRunner {
    launcher: Arc<dyn ProcessLauncher>,
    busy: Arc<AtomicBool>,
}

impl CommandRunner {
    pub fn new(launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            launcher,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Runner backed by real processes.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemLauncher))
    }

    /// Runner on the same launcher with its own, independent slot.
    #[must_use]
    pub fn sibling(&self) -> Self {
        Self::new(Arc::clone(&self.launcher))
    }

    /// Whether a command currently occupies the slot.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Starts `argv` in the background and calls `on_complete` exactly once
    /// when it finishes. The slot is free again before `on_complete` runs.
    ///
    /// Returns `false` without running anything when another command is in
    /// flight; `on_complete` is then dropped uncalled.
    pub fn run<F>(&self, argv: Vec<String>, on_complete: F) -> bool
    where
        F: FnOnce(CommandInvocation, CommandResult) + Send + 'static,
    {
        self.spawn(argv, true, on_complete)
    }

    /// Like [`run`](Self::run), but the slot stays taken after the command
    /// exits until [`release`](Self::release) is called.
    ///
    /// The event loop releases the slot when it handles the result, so a
    /// request queued behind the completion cannot take the slot first.
    pub fn run_until_released<F>(&self, argv: Vec<String>, on_complete: F) -> bool
    where
        F: FnOnce(CommandInvocation, CommandResult) + Send + 'static,
    {
        self.spawn(argv, false, on_complete)
    }

    /// Frees the slot held by [`run_until_released`](Self::run_until_released).
    pub fn release(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }

    fn spawn<F>(&self, argv: Vec<String>, release_on_exit: bool, on_complete: F) -> bool
    where
        F: FnOnce(CommandInvocation, CommandResult) + Send + 'static,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            crate::log_debug!("SERVICE", "Dropped '{}': command in flight", argv.join(" "));
            return false;
        }

        let invocation = CommandInvocation {
            argv,
            started_at: SystemTime::now(),
        };
        crate::log_debug!("SERVICE", "Running: {}", invocation.argv.join(" "));

        let launcher = Arc::clone(&self.launcher);
        let busy = Arc::clone(&self.busy);
        let spawned = thread::Builder::new()
            .name("command-runner".to_string())
            .spawn(move || {
                let result = launcher.launch(&invocation.argv);
                if release_on_exit {
                    busy.store(false, Ordering::SeqCst);
                }
                on_complete(invocation, result);
            });

        if let Err(e) = spawned {
            crate::log_error!("SERVICE", "Could not spawn command thread: {e}");
            self.release();
            return false;
        }
        true
    }

    /// Runs `argv` on the calling thread, bypassing the slot.
    ///
    /// Used by one-shot CLI commands and capability detection, where nothing
    /// else competes for the runner.
    pub fn run_blocking(&self, argv: &[String]) -> CommandResult {
        self.launcher.launch(argv)
    }
}
