//! Running the helper process
//!
//! [`CommandExecutor`] is the seam between the client and the operating
//! system. Production code spawns a real process; tests substitute scripted
//! or in-process implementations.

use gem_keychain_core::types::{CommandArguments, EnvironmentVariables};
use gem_keychain_core::{CommandResult, Error, Result};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs one helper invocation to completion
pub trait CommandExecutor: Send + Sync {
    /// Run `program` with `args`, feed it `stdin` and wait for it to exit.
    ///
    /// An `Err` means the process could not be run at all; a process that ran
    /// and failed is reported through the returned exit code.
    fn execute(
        &self,
        program: &Path,
        args: &CommandArguments,
        stdin: Option<&[u8]>,
        env: &EnvironmentVariables,
    ) -> Result<CommandResult>;
}

/// Spawns the helper as a child process
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(
        &self,
        program: &Path,
        args: &CommandArguments,
        stdin: Option<&[u8]>,
        env: &EnvironmentVariables,
    ) -> Result<CommandResult> {
        let spawn_failure = |e: std::io::Error| {
            Error::helper_failure(
                program.display().to_string(),
                args.as_slice().to_vec(),
                format!("failed to run helper: {e}"),
                None,
            )
        };

        let mut child = Command::new(program)
            .args(args.as_slice())
            .envs(env.iter())
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_failure)?;

        // Write everything, then close the pipe so the helper sees EOF
        if let (Some(payload), Some(mut pipe)) = (stdin, child.stdin.take()) {
            match pipe.write_all(payload) {
                Ok(()) => {}
                // The helper exited without reading; its exit status says why
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    tracing::debug!("helper closed stdin early");
                }
                Err(e) => return Err(spawn_failure(e)),
            }
        }

        let output = child.wait_with_output().map_err(spawn_failure)?;
        Ok(CommandResult {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Scripted executor for unit tests
#[cfg(test)]
#[derive(Clone, Default)]
pub struct TestCommandExecutor {
    responses: std::sync::Arc<std::sync::Mutex<std::collections::HashMap<String, CommandResult>>>,
    calls: std::sync::Arc<std::sync::Mutex<Vec<RecordedCall>>>,
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub args: Vec<String>,
    pub stdin: Option<Vec<u8>>,
}

#[cfg(test)]
impl TestCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `args` with `exit_code`, `stdout` and `stderr`
    pub fn add_response(&self, args: &[&str], exit_code: i32, stdout: &[u8], stderr: &str) {
        let result = CommandResult {
            exit_code: Some(exit_code),
            stdout: stdout.to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        };
        self.responses
            .lock()
            .expect("test responses lock")
            .insert(args.join(" "), result);
    }

    pub fn add_success(&self, args: &[&str], stdout: &[u8]) {
        self.add_response(args, 0, stdout, "");
    }

    pub fn add_not_found(&self, args: &[&str]) {
        self.add_response(args, 1, b"", "");
    }

    pub fn add_failure(&self, args: &[&str], stderr: &str) {
        self.add_response(args, 2, b"", stderr);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("test calls lock").clone()
    }
}

#[cfg(test)]
impl CommandExecutor for TestCommandExecutor {
    fn execute(
        &self,
        _program: &Path,
        args: &CommandArguments,
        stdin: Option<&[u8]>,
        _env: &EnvironmentVariables,
    ) -> Result<CommandResult> {
        self.calls.lock().expect("test calls lock").push(RecordedCall {
            args: args.as_slice().to_vec(),
            stdin: stdin.map(<[u8]>::to_vec),
        });

        let key = args.as_slice().join(" ");
        let responses = self.responses.lock().expect("test responses lock");
        responses
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::configuration(format!("no test response configured for: {key}")))
    }
}

/// Factory for creating command executors
pub struct CommandExecutorFactory;

impl CommandExecutorFactory {
    pub fn system() -> Box<dyn CommandExecutor> {
        Box::new(SystemCommandExecutor::new())
    }

    #[cfg(test)]
    pub fn test() -> TestCommandExecutor {
        TestCommandExecutor::new()
    }
}
