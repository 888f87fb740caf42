//! The helper process protocol
//!
//! A request is `helper <command> [host]` plus optional bytes on stdin. The
//! reply is the process exit code, a payload on stdout and diagnostics on
//! stderr. Exit codes are modelled as [`HelperExit`] so neither side compares
//! raw integers.

use crate::errors::{Error, Result};
use crate::types::{CommandArguments, Host, SecretBytes};
use std::fmt;
use std::str::FromStr;

/// Commands understood by the helper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelperCommand {
    HasToken,
    GetToken,
    ListTokens,
    SetToken,
    RmToken,
    HasKey,
    ImportKey,
    GenerateKey,
    GetCert,
    Sign,
}

impl HelperCommand {
    pub const ALL: [HelperCommand; 10] = [
        HelperCommand::HasToken,
        HelperCommand::GetToken,
        HelperCommand::ListTokens,
        HelperCommand::SetToken,
        HelperCommand::RmToken,
        HelperCommand::HasKey,
        HelperCommand::ImportKey,
        HelperCommand::GenerateKey,
        HelperCommand::GetCert,
        HelperCommand::Sign,
    ];

    /// The argv spelling of the command
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HelperCommand::HasToken => "has-token",
            HelperCommand::GetToken => "get-token",
            HelperCommand::ListTokens => "list-tokens",
            HelperCommand::SetToken => "set-token",
            HelperCommand::RmToken => "rm-token",
            HelperCommand::HasKey => "has-key",
            HelperCommand::ImportKey => "import-key",
            HelperCommand::GenerateKey => "generate-key",
            HelperCommand::GetCert => "get-cert",
            HelperCommand::Sign => "sign",
        }
    }

    /// Whether the command takes an optional positional host
    #[must_use]
    pub const fn accepts_host(self) -> bool {
        matches!(
            self,
            HelperCommand::HasToken
                | HelperCommand::GetToken
                | HelperCommand::SetToken
                | HelperCommand::RmToken
        )
    }

    /// Whether the command consumes a payload on stdin
    #[must_use]
    pub const fn reads_stdin(self) -> bool {
        matches!(
            self,
            HelperCommand::SetToken | HelperCommand::ImportKey | HelperCommand::Sign
        )
    }

    /// Query commands are the only ones allowed to answer "not found"
    #[must_use]
    pub const fn may_report_not_found(self) -> bool {
        matches!(
            self,
            HelperCommand::HasToken | HelperCommand::GetToken | HelperCommand::HasKey
        )
    }
}

impl fmt::Display for HelperCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HelperCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        HelperCommand::ALL
            .into_iter()
            .find(|command| command.as_str() == s)
            .ok_or_else(|| Error::usage(format!("unknown command '{s}'")))
    }
}

/// Tagged form of the helper's exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperExit {
    Success,
    NotFound,
    Failure,
}

impl HelperExit {
    /// The process exit code the helper emits
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            HelperExit::Success => 0,
            HelperExit::NotFound => 1,
            HelperExit::Failure => 2,
        }
    }

    /// Classify a raw exit status returned for `command`.
    ///
    /// `None` means the process was terminated without an exit code. Code 1
    /// only means "not found" for query commands; anywhere else it is a failure.
    #[must_use]
    pub fn classify(command: HelperCommand, code: Option<i32>) -> Self {
        match code {
            Some(0) => HelperExit::Success,
            Some(1) if command.may_report_not_found() => HelperExit::NotFound,
            _ => HelperExit::Failure,
        }
    }
}

impl From<HelperExit> for std::process::ExitCode {
    fn from(exit: HelperExit) -> Self {
        std::process::ExitCode::from(exit.code())
    }
}

/// One helper invocation
#[derive(Clone)]
pub struct CommandRequest {
    pub command: HelperCommand,
    pub host: Host,
    pub stdin: Option<SecretBytes>,
}

impl CommandRequest {
    #[must_use]
    pub fn new(command: HelperCommand) -> Self {
        Self {
            command,
            host: Host::Default,
            stdin: None,
        }
    }

    #[must_use]
    pub fn with_host(mut self, host: Host) -> Self {
        self.host = host;
        self
    }

    #[must_use]
    pub fn with_stdin(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(SecretBytes::new(payload.into()));
        self
    }

    /// The argv tail: the command followed by the host when it is not the default
    #[must_use]
    pub fn arguments(&self) -> CommandArguments {
        let mut args = CommandArguments::new();
        args.push(self.command.as_str());
        if self.command.accepts_host() {
            if let Some(host) = self.host.argument() {
                args.push(host);
            }
        }
        args
    }
}

impl fmt::Debug for CommandRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRequest")
            .field("command", &self.command)
            .field("host", &self.host)
            .field("stdin_len", &self.stdin.as_ref().map(|payload| payload.len()))
            .finish()
    }
}

/// What came back from one helper process
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandResult {
    #[must_use]
    pub fn exit(&self, command: HelperCommand) -> HelperExit {
        HelperExit::classify(command, self.exit_code)
    }

    /// Diagnostic text from stderr, trimmed
    #[must_use]
    pub fn message(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

impl fmt::Debug for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandResult")
            .field("exit_code", &self.exit_code)
            .field("stdout_len", &self.stdout.len())
            .field("stderr", &String::from_utf8_lossy(&self.stderr))
            .finish()
    }
}

/// Strip a single trailing `\n` or `\r\n`
#[must_use]
pub fn trim_line_ending(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    bytes.strip_suffix(b"\r").unwrap_or(bytes)
}
