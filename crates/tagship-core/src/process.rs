use crate::errors::{ReleaseError, Result};
use std::io;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tracing::debug;

/// Creates a `Command` that can resolve `.cmd` and `.bat` scripts on Windows.
///
/// npm is installed as a batch script on Windows, which `std::process::Command`
/// does not resolve on its own, so the invocation goes through `cmd.exe /C`.
pub fn command(program: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", program]);
        cmd
    } else {
        Command::new(program)
    }
}

/// How state-changing external commands are carried out.
///
/// `DryRun` prints each mutating command instead of spawning it. Read-only
/// queries go through [`Executor::capture`] and always run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Executor {
    #[default]
    Live,
    DryRun,
}

/// How the child's output is handled by [`Executor::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Stream stdout/stderr to the terminal.
    Inherit,
    /// Capture output; stderr is attached to the error on failure.
    Piped,
}

impl Executor {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run { Self::DryRun } else { Self::Live }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun)
    }

    /// Run a state-changing command.
    pub fn run(&self, program: &str, args: &[&str], cwd: &Path, mode: OutputMode) -> Result<()> {
        let shown = format_command_display(program, args);
        if self.is_dry_run() {
            debug!(command = %shown, cwd = %cwd.display(), "dry-run: skipping command");
            println!("[dryrun] {shown}");
            return Ok(());
        }

        debug!(command = %shown, cwd = %cwd.display(), "running command");
        let mut cmd = command(program);
        cmd.args(args).current_dir(cwd);
        match mode {
            OutputMode::Inherit => {
                let status = cmd.status().map_err(|e| spawn_error(program, e))?;
                if !status.success() {
                    return Err(ReleaseError::CommandFailed {
                        command: shown,
                        status: status.to_string(),
                        stderr: String::new(),
                    });
                }
            }
            OutputMode::Piped => {
                let output = cmd
                    .stdin(Stdio::null())
                    .output()
                    .map_err(|e| spawn_error(program, e))?;
                check_output(shown, &output)?;
            }
        }
        Ok(())
    }

    /// Run a read-only query and return its trimmed stdout.
    pub fn capture(&self, program: &str, args: &[&str], cwd: &Path) -> Result<String> {
        let shown = format_command_display(program, args);
        debug!(command = %shown, cwd = %cwd.display(), "querying");
        let output = command(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(program, e))?;
        check_output(shown, &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn check_output(shown: String, output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    Err(ReleaseError::CommandFailed {
        command: shown,
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

fn spawn_error(program: &str, err: io::Error) -> ReleaseError {
    if err.kind() == io::ErrorKind::NotFound {
        ReleaseError::CommandNotFound(program.to_string())
    } else {
        ReleaseError::Io(err)
    }
}

pub fn format_command_display(program: &str, args: &[&str]) -> String {
    let mut text = program.to_string();
    for arg in args {
        text.push(' ');
        text.push_str(arg);
    }
    text
}
