//! Subprocess runner for external toolchain invocations
//!
//! Both evaluators that shell out (`make` for module builds, `clang-tidy`
//! for lint analysis) go through this module:
//! 1. Spawn the tool with `std::process::Command`, stdout/stderr piped
//! 2. Wait with a bounded timeout, killing the process on expiry
//! 3. Hand back a structured result — a missing executable or a timeout
//!    becomes a result value, never a propagated error

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Result from running an external tool
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Whether the tool ran to completion (its exit code may still be non-zero)
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    /// Error message when the tool could not be run at all
    pub error: Option<String>,
}

impl ToolOutput {
    pub fn completed(stdout: String, stderr: String, exit_code: i32) -> Self {
        Self {
            success: true,
            stdout,
            stderr,
            exit_code: Some(exit_code),
            timed_out: false,
            error: None,
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            timed_out: false,
            error: Some(error),
        }
    }

    pub fn timeout(tool_name: &str, timeout_secs: u64) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            timed_out: true,
            error: Some(format!("{} timed out after {}s", tool_name, timeout_secs)),
        }
    }

    /// Combined stdout + stderr. make and clang-tidy both interleave
    /// diagnostics across the two streams.
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }

    /// Exit code zero after a normal completion
    pub fn exit_ok(&self) -> bool {
        self.success && self.exit_code == Some(0)
    }
}

/// Run an external tool with standard error handling
///
/// # Arguments
/// * `cmd` - Command and arguments to run
/// * `tool_name` - Human-readable tool name for error messages
/// * `timeout_secs` - Timeout in seconds (0 = no timeout)
/// * `cwd` - Working directory for the tool
pub fn run_tool(
    cmd: &[String],
    tool_name: &str,
    timeout_secs: u64,
    cwd: Option<&Path>,
) -> ToolOutput {
    if cmd.is_empty() {
        return ToolOutput::failure("Empty command".to_string());
    }

    let program = &cmd[0];
    let args = &cmd[1..];

    debug!("Running {}: {} {:?}", tool_name, program, args);

    let mut command = Command::new(program);
    command.args(args);

    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                return ToolOutput::failure(format!(
                    "{} not found. Please install it first.",
                    tool_name
                ));
            }
            return ToolOutput::failure(format!("Failed to run {}: {}", tool_name, e));
        }
    };

    if timeout_secs > 0 {
        wait_with_timeout(child, tool_name, timeout_secs)
    } else {
        wait_without_timeout(child, tool_name)
    }
}

fn wait_without_timeout(child: std::process::Child, tool_name: &str) -> ToolOutput {
    let output = match child.wait_with_output() {
        Ok(output) => output,
        Err(e) => {
            return ToolOutput::failure(format!("Failed to wait for {}: {}", tool_name, e));
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    ToolOutput::completed(stdout, stderr, exit_code)
}

/// Poll for completion with small sleep intervals, killing on deadline.
///
/// Both pipes are drained on background threads from the start; a tool
/// that writes more than the OS pipe buffer would otherwise block and be
/// misreported as a timeout.
fn wait_with_timeout(
    mut child: std::process::Child,
    tool_name: &str,
    timeout_secs: u64,
) -> ToolOutput {
    let start = Instant::now();
    let timeout = Duration::from_secs(timeout_secs);

    let stdout_reader = child.stdout.take().map(spawn_pipe_reader);
    let stderr_reader = child.stderr.take().map(spawn_pipe_reader);

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    // Reap and close the pipes so the readers finish
                    let _ = child.wait();
                    break None;
                }
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(e) => {
                return ToolOutput::failure(format!("Failed to wait for {}: {}", tool_name, e));
            }
        }
    };

    let stdout = drain_reader(stdout_reader);
    let stderr = drain_reader(stderr_reader);

    match status {
        Some(status) => ToolOutput::completed(stdout, stderr, status.code().unwrap_or(-1)),
        None => {
            warn!("{} timed out after {}s", tool_name, timeout_secs);
            ToolOutput::timeout(tool_name, timeout_secs)
        }
    }
}

fn spawn_pipe_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        let _ = pipe.read_to_end(&mut bytes);
        String::from_utf8_lossy(&bytes).to_string()
    })
}

fn drain_reader(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
        .trim_end_matches('\n')
        .to_string()
}

/// Check that a tool exists and answers `--version` with exit code zero.
pub fn tool_available(program: &str, tool_name: &str) -> bool {
    run_tool(
        &[program.to_string(), "--version".to_string()],
        tool_name,
        5,
        None,
    )
    .exit_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_is_failure_not_panic() {
        let result = run_tool(
            &["kerneval-no-such-binary".to_string()],
            "no-such-tool",
            5,
            None,
        );
        assert!(!result.success);
        assert!(!result.timed_out);
        assert!(result.error.expect("error message").contains("not found"));
    }

    #[test]
    fn test_successful_run_captures_output() {
        let result = run_tool(
            &["echo".to_string(), "hello".to_string()],
            "echo",
            5,
            None,
        );
        assert!(result.exit_ok());
        assert!(result.stdout.contains("hello"));
    }

    #[test]
    fn test_large_output_is_drained_not_timed_out() {
        // Emits well past the OS pipe buffer, then exits immediately
        let script = "i=0; while [ $i -lt 2000 ]; do \
                      echo 'a fairly long line of filler output for the pipe buffer'; \
                      i=$((i+1)); done";
        let result = run_tool(
            &["/bin/sh".to_string(), "-c".to_string(), script.to_string()],
            "sh",
            10,
            None,
        );
        assert!(result.exit_ok(), "error: {:?}", result.error);
        assert!(!result.timed_out);
        assert!(result.stdout.len() > 64 * 1024, "len = {}", result.stdout.len());
    }

    #[test]
    fn test_timeout_kills_process() {
        let result = run_tool(
            &["sleep".to_string(), "10".to_string()],
            "sleep",
            1,
            None,
        );
        assert!(result.timed_out);
        assert!(!result.success);
    }

    #[test]
    fn test_combined_output() {
        let out = ToolOutput::completed("a".to_string(), "b".to_string(), 0);
        assert_eq!(out.combined_output(), "a\nb");

        let out = ToolOutput::completed("a".to_string(), String::new(), 0);
        assert_eq!(out.combined_output(), "a");
    }

    #[test]
    fn test_empty_command() {
        let result = run_tool(&[], "nothing", 5, None);
        assert!(!result.success);
    }
}
