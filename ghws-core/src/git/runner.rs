//! Subprocess seam for the git executable

use std::ffi::OsString;
use std::io;
use std::process::{Command, Output};

/// Runs an external program and captures its output
///
/// `GitCli` goes through this trait so tests can script git's exit codes
/// without spawning processes.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<Output>;
}

/// Runs commands with `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<Output> {
        Command::new(program)
            .args(args)
            // never block on a credential prompt
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
    }
}

/// Human-readable detail for a failed command
///
/// Git splits a failure across both streams (a conflicted pull prints the fetch
/// summary on stderr and the `CONFLICT` lines on stdout), so both are kept,
/// stderr first. Falls back to the exit status when neither has text.
pub fn failure_detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    match (stderr.is_empty(), stdout.is_empty()) {
        (false, false) => format!("{}\n{}", stderr, stdout),
        (false, true) => stderr,
        (true, false) => stdout,
        (true, true) => format!("exit status {}", output.status),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;

    fn output(code: i32, stdout: &str, stderr: &str) -> Output {
        Output {
            status: ExitStatus::from_raw(code << 8),
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_detail_keeps_both_streams() {
        let detail = failure_detail(&output(
            1,
            "CONFLICT (content): Merge conflict in README.md\n",
            "From ../remote\n   4827f77..7bde5f1  main -> origin/main\n",
        ));
        assert!(detail.starts_with("From ../remote"));
        assert!(detail.contains("CONFLICT (content)"));
    }

    #[test]
    fn test_detail_single_stream_and_status() {
        assert_eq!(failure_detail(&output(128, "", "fatal: boom\n")), "fatal: boom");
        assert_eq!(failure_detail(&output(1, "only out", "")), "only out");
        assert!(failure_detail(&output(2, "", "")).contains("exit status"));
    }
}
