//! External process execution
//!
//! Commands are built as argument vectors and never pass through a shell.
//! [`CommandRunner`] is the seam between the pipeline and the operating
//! system, so the scheduler can be driven without real encoders installed.

use crate::error::{Result, TransflacError};
use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::process::{Child, ChildStderr, Command, Stdio};
use std::thread::{self, JoinHandle};
use tracing::trace;

/// One external program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Copy-pasteable shell rendering, for logs only
    pub fn display(&self) -> String {
        std::iter::once(crate::command::shell_quote(&self.program))
            .chain(
                self.args
                    .iter()
                    .map(|a| crate::command::shell_quote(&a.to_string_lossy())),
            )
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Result of a finished command or pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// True only if every stage exited zero
    pub success: bool,
    /// Exit code of the first failing stage (or the last stage on success)
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Short description of a failure for log lines
    pub fn failure_reason(&self) -> String {
        let status = match self.code {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        };
        match self.stderr.trim() {
            "" => status,
            stderr => format!("{}: {}", status, stderr),
        }
    }
}

/// Runs external commands
pub trait CommandRunner: Send + Sync {
    /// Run a single command to completion, capturing its output
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput>;

    /// Run stages with each stage's stdout feeding the next stage's stdin
    fn run_pipeline(&self, stages: &[CommandSpec]) -> Result<CommandOutput>;
}

/// [`CommandRunner`] backed by `std::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        trace!("exec: {}", command.display());
        let output = command
            .to_command()
            .stdin(Stdio::null())
            .output()
            .map_err(|e| TransflacError::spawn_error(&command.program, e))?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn run_pipeline(&self, stages: &[CommandSpec]) -> Result<CommandOutput> {
        let Some((last, upstream)) = stages.split_last() else {
            return Ok(CommandOutput {
                success: true,
                ..CommandOutput::default()
            });
        };

        let mut children: Vec<(&CommandSpec, Child, JoinHandle<String>)> =
            Vec::with_capacity(upstream.len());
        let mut previous_stdout: Option<Stdio> = None;

        for stage in upstream {
            trace!("exec: {}", stage.display());
            let spawned = stage
                .to_command()
                .stdin(previous_stdout.take().unwrap_or_else(Stdio::null))
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn();
            let mut child = match spawned {
                Ok(child) => child,
                Err(e) => {
                    reap(children);
                    return Err(TransflacError::spawn_error(&stage.program, e));
                }
            };
            previous_stdout = child.stdout.take().map(Stdio::from);
            let stderr = drain(child.stderr.take());
            children.push((stage, child, stderr));
        }

        trace!("exec: {}", last.display());
        let spawned = last
            .to_command()
            .stdin(previous_stdout.take().unwrap_or_else(Stdio::null))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();
        let tail = match spawned {
            Ok(child) => child,
            Err(e) => {
                reap(children);
                return Err(TransflacError::spawn_error(&last.program, e));
            }
        };

        let tail_output = tail.wait_with_output()?;

        let mut result = CommandOutput {
            success: tail_output.status.success(),
            code: tail_output.status.code(),
            stdout: String::from_utf8_lossy(&tail_output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&tail_output.stderr).into_owned(),
        };

        // First failing stage wins, so a decoder error is not masked by an
        // encoder that happily consumed an empty stream.
        for (stage, mut child, stderr) in children {
            let status = child.wait()?;
            let stderr = stderr.join().unwrap_or_default();
            if !status.success() && result.success {
                result = CommandOutput {
                    success: false,
                    code: status.code(),
                    stdout: String::new(),
                    stderr: format!("{}: {}", stage.program, stderr.trim()),
                };
            }
        }

        Ok(result)
    }
}

/// Wait on already-started stages after a later stage failed to spawn
fn reap(children: Vec<(&CommandSpec, Child, JoinHandle<String>)>) {
    for (_, mut child, stderr) in children {
        let _ = child.kill();
        let _ = child.wait();
        let _ = stderr.join();
    }
}

/// Read a stage's stderr on its own thread so a chatty stage never blocks
/// on a full pipe
fn drain(pipe: Option<ChildStderr>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut stderr = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut stderr);
        }
        stderr
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_arguments() {
        let cmd = CommandSpec::new("lame").arg("--tt").arg("Don't Stop");
        assert_eq!(cmd.display(), r#"'lame' '--tt' 'Don'"'"'t Stop'"#);
    }

    #[test]
    fn test_failure_reason_includes_stderr() {
        let out = CommandOutput {
            success: false,
            code: Some(2),
            stdout: String::new(),
            stderr: "bad input\n".into(),
        };
        assert_eq!(out.failure_reason(), "exit status 2: bad input");
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let runner = SystemRunner::new();
        let err = runner
            .run(&CommandSpec::new("transflac-no-such-program"))
            .unwrap_err();
        assert!(matches!(err, TransflacError::SpawnError { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_exit_status() {
        let runner = SystemRunner::new();
        assert!(runner.run(&CommandSpec::new("true")).unwrap().success);
        let out = runner.run(&CommandSpec::new("false")).unwrap();
        assert!(!out.success);
        assert_eq!(out.code, Some(1));
    }

    #[cfg(unix)]
    #[test]
    fn test_pipeline_chains_stdout() {
        let runner = SystemRunner::new();
        let stages = [
            CommandSpec::new("echo").arg("it's 100% fine"),
            CommandSpec::new("cat"),
        ];
        let out = runner.run_pipeline(&stages).unwrap();
        assert!(out.success);
        assert_eq!(out.stdout.trim_end(), "it's 100% fine");
    }

    #[cfg(unix)]
    #[test]
    fn test_pipeline_fails_when_upstream_fails() {
        let runner = SystemRunner::new();
        let stages = [CommandSpec::new("false"), CommandSpec::new("cat")];
        let out = runner.run_pipeline(&stages).unwrap();
        assert!(!out.success);
        assert_eq!(out.code, Some(1));
    }

    #[cfg(unix)]
    #[test]
    fn test_pipeline_survives_chatty_upstream_stderr() {
        // far more than a pipe buffer of warnings before any stdout
        let script = "i=0; while [ $i -lt 4000 ]; do \
                      echo 'WARNING: clipping in sample block' >&2; i=$((i+1)); done; \
                      echo done; exit 3";
        let runner = SystemRunner::new();
        let stages = [
            CommandSpec::new("sh").arg("-c").arg(script),
            CommandSpec::new("cat"),
        ];
        let out = runner.run_pipeline(&stages).unwrap();
        assert!(!out.success);
        assert_eq!(out.code, Some(3));
        assert!(out.stderr.starts_with("sh: WARNING: clipping"));
        assert!(out.stderr.len() > 100_000);
    }
}
