//! Typed access to the helper process
//!
//! Every call spawns a fresh helper. The client never retries and never turns
//! a failure into "not found": only exit code 1 on a query command means
//! absence, everything else nonzero is an operational failure carrying the
//! helper's stderr.

use crate::executor::{CommandExecutor, CommandExecutorFactory};
use gem_keychain_core::types::EnvironmentVariables;
use gem_keychain_core::{
    trim_line_ending, CommandRequest, Error, HelperCommand, HelperExit, Host, Result, SecretBytes,
    SecretText,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use x509_cert::der::DecodePem;
use x509_cert::Certificate;

pub(crate) const NO_KEY_MESSAGE: &str =
    "the keychain holds no signing key, import or generate one first";

/// What a helper invocation produced
pub enum HelperOutcome {
    /// Exit code 0 and the helper's stdout
    Success(SecretBytes),
    /// The query found nothing
    NotFound,
}

impl std::fmt::Debug for HelperOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HelperOutcome::Success(stdout) => write!(f, "Success({} bytes)", stdout.len()),
            HelperOutcome::NotFound => f.write_str("NotFound"),
        }
    }
}

/// Client for the `gem-keychain-helper` protocol
pub struct HelperClient {
    program: PathBuf,
    executor: Box<dyn CommandExecutor>,
    env: EnvironmentVariables,
}

impl HelperClient {
    /// Client that spawns `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_executor(program, CommandExecutorFactory::system())
    }

    pub fn with_executor(program: impl Into<PathBuf>, executor: Box<dyn CommandExecutor>) -> Self {
        Self {
            program: program.into(),
            executor,
            env: EnvironmentVariables::new(),
        }
    }

    /// Set an environment variable on every helper invocation
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key, value);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run one command and classify its exit status
    pub fn invoke(
        &self,
        command: HelperCommand,
        host: &Host,
        stdin: Option<&[u8]>,
    ) -> Result<HelperOutcome> {
        let mut request = CommandRequest::new(command).with_host(host.clone());
        if let Some(payload) = stdin {
            request = request.with_stdin(payload);
        }
        let args = request.arguments();
        tracing::debug!(?request, "invoking helper");

        let result = self.executor.execute(
            &self.program,
            &args,
            request.stdin.as_ref().map(|payload| payload.as_slice()),
            &self.env,
        )?;

        match result.exit(command) {
            HelperExit::Success => Ok(HelperOutcome::Success(SecretBytes::new(result.stdout))),
            HelperExit::NotFound => {
                tracing::debug!(%command, %host, "helper reported not found");
                Ok(HelperOutcome::NotFound)
            }
            HelperExit::Failure => {
                let message = result.message();
                tracing::debug!(%command, exit_code = ?result.exit_code, %message, "helper failed");
                Err(Error::helper_failure(
                    self.program.display().to_string(),
                    args.into_inner(),
                    message,
                    result.exit_code,
                ))
            }
        }
    }

    /// Run a command that has no "not found" answer
    fn run(&self, command: HelperCommand, host: &Host, stdin: Option<&[u8]>) -> Result<SecretBytes> {
        match self.invoke(command, host, stdin)? {
            HelperOutcome::Success(stdout) => Ok(stdout),
            HelperOutcome::NotFound => Err(Error::helper_failure(
                self.program.display().to_string(),
                vec![command.to_string()],
                "unexpected not-found reply",
                Some(i32::from(HelperExit::NotFound.code())),
            )),
        }
    }

    fn query(&self, command: HelperCommand, host: &Host) -> Result<Option<SecretBytes>> {
        match self.invoke(command, host, None)? {
            HelperOutcome::Success(stdout) => Ok(Some(stdout)),
            HelperOutcome::NotFound => Ok(None),
        }
    }

    pub fn has_token(&self, host: &Host) -> Result<bool> {
        Ok(self.query(HelperCommand::HasToken, host)?.is_some())
    }

    /// The stored api key for `host`, `None` if there is none
    pub fn get_token(&self, host: &Host) -> Result<Option<SecretText>> {
        let Some(stdout) = self.query(HelperCommand::GetToken, host)? else {
            return Ok(None);
        };
        let token = std::str::from_utf8(trim_line_ending(&stdout)).map_err(|_| {
            Error::store("read api key", format!("api key for {host} is not valid UTF-8"))
        })?;
        Ok(Some(SecretText::new(token.to_string())))
    }

    /// Hosts with a stored api key
    pub fn list_tokens(&self) -> Result<BTreeSet<String>> {
        let stdout = self.run(HelperCommand::ListTokens, &Host::Default, None)?;
        Ok(String::from_utf8_lossy(&stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Store an api key, replacing any existing one for `host`
    pub fn set_token(&self, host: &Host, token: &str) -> Result<()> {
        if token.is_empty() || token.contains(['\n', '\r']) {
            return Err(Error::usage("api key must be a single non-empty line"));
        }
        let mut payload = SecretBytes::new(Vec::with_capacity(token.len() + 1));
        payload.extend_from_slice(token.as_bytes());
        payload.push(b'\n');
        self.run(HelperCommand::SetToken, host, Some(&payload))?;
        Ok(())
    }

    /// Remove the api key for `host`; succeeds if there was none
    pub fn rm_token(&self, host: &Host) -> Result<()> {
        self.run(HelperCommand::RmToken, host, None)?;
        Ok(())
    }

    pub fn has_key(&self) -> Result<bool> {
        Ok(self.query(HelperCommand::HasKey, &Host::Default)?.is_some())
    }

    /// Hand a PEM private key to the helper. Fails if one is already stored.
    pub fn import_key(&self, pem: &[u8]) -> Result<()> {
        self.run(HelperCommand::ImportKey, &Host::Default, Some(pem))?;
        Ok(())
    }

    /// Have the helper generate a signing key. Fails if one is already stored.
    pub fn generate_key(&self) -> Result<()> {
        self.run(HelperCommand::GenerateKey, &Host::Default, None)?;
        Ok(())
    }

    /// A currently valid certificate, issued by the helper if necessary
    pub fn get_cert(&self) -> Result<Certificate> {
        let pem = self
            .run(HelperCommand::GetCert, &Host::Default, None)
            .map_err(|e| self.explain_identity_failure(e))?;
        Certificate::from_pem(pem.as_slice())
            .map_err(|e| Error::crypto("read certificate", e.to_string()))
    }

    /// Raw PKCS#1 v1.5 SHA-1 signature over `data`
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let signature = self
            .run(HelperCommand::Sign, &Host::Default, Some(data))
            .map_err(|e| self.explain_identity_failure(e))?;
        Ok(signature.to_vec())
    }

    /// The helper reports a missing key as a plain failure; ask it whether a
    /// key exists so callers can tell the two apart
    fn explain_identity_failure(&self, err: Error) -> Error {
        if !matches!(err, Error::HelperFailure { .. }) {
            return err;
        }
        match self.has_key() {
            Ok(false) => Error::key_absent(NO_KEY_MESSAGE),
            _ => err,
        }
    }
}

impl std::fmt::Debug for HelperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelperClient")
            .field("program", &self.program)
            .field("env", &self.env.keys().collect::<Vec<_>>())
            .finish()
    }
}
