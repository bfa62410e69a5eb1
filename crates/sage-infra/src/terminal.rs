//! Terminal dispatch and inline shell execution.
//!
//! Commands chosen from an assistant reply open in a separate terminal
//! window that stays up for a few seconds after the command finishes.
//! Lines the user types that start with a known executable run inline.

use std::process::{ExitStatus, Stdio};

use sage_core::command::CommandDispatcher;
use sage_types::error::ExecutionError;

const COMPLETION_NOTICE: &str =
    "echo 'Command completed. This window will close in 5 seconds.'; sleep 5";

/// Build the argv that opens `command` in `terminal`.
///
/// xterm and konsole take the script as one `-e` string, xfce4-terminal as a
/// `--command` string. Everything else gets the gnome-terminal form
/// (`-- bash -c <script>`).
pub fn terminal_argv(terminal: &str, command: &str) -> Vec<String> {
    let script = format!("{command}; {COMPLETION_NOTICE}");
    let quoted = format!("bash -c {}", shell_quote(&script));

    match terminal {
        "xterm" | "konsole" => vec![terminal.to_string(), "-e".to_string(), quoted],
        "xfce4-terminal" => vec![terminal.to_string(), "--command".to_string(), quoted],
        _ => vec![
            terminal.to_string(),
            "--".to_string(),
            "bash".to_string(),
            "-c".to_string(),
            script,
        ],
    }
}

/// Single-quote `s` for a POSIX shell.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Opens commands in the configured terminal emulator.
#[derive(Debug, Default)]
pub struct TerminalDispatcher;

impl TerminalDispatcher {
    pub fn new() -> Self {
        Self
    }
}

impl CommandDispatcher for TerminalDispatcher {
    fn dispatch(&self, command: &str, terminal_emulator: &str) -> Result<(), ExecutionError> {
        let argv = terminal_argv(terminal_emulator, command);
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ExecutionError::TerminalNotFound(terminal_emulator.to_string()))?;

        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match child {
            Ok(child) => {
                tracing::debug!(pid = ?child.id(), terminal = terminal_emulator, "terminal spawned");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(ExecutionError::TerminalNotFound(terminal_emulator.to_string()))
            }
            Err(err) => Err(ExecutionError::Spawn {
                program: program.clone(),
                reason: err.to_string(),
            }),
        }
    }
}

/// Run `line` through `sh -c` in the current terminal and wait for it.
pub async fn run_inline(line: &str) -> Result<ExitStatus, ExecutionError> {
    tokio::process::Command::new("sh")
        .arg("-c")
        .arg(line)
        .status()
        .await
        .map_err(|err| ExecutionError::Spawn {
            program: "sh".to_string(),
            reason: err.to_string(),
        })
}
