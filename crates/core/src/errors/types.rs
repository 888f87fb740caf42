//! Core error type definitions

use std::path::PathBuf;

/// Result type alias for gem-keychain operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gem-keychain operations
///
/// Expected absence is never an error: inside the helper it is `None`, at the
/// client boundary it is `HelperExit::NotFound`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Secret store backend failures (unreachable, permission denied, corrupt data)
    #[error("secret store {operation} failed: {message}")]
    Store {
        operation: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An item that may only be created once already exists
    #[error("{item} already exists")]
    AlreadyExists { item: String },

    /// No signing key is present in the store
    #[error("no signing key: {message}")]
    KeyAbsent { message: String },

    /// A signing key exists but no certificate has been issued for it yet
    #[error("no signing certificate: {message}")]
    CertificateMissing { message: String },

    /// The stored certificate is outside its validity window
    #[error("signing certificate expired: {message}")]
    CertificateExpired { message: String },

    /// The helper process failed or could not be run
    #[error("{}", format_helper_error(.command, .args, .message, .exit_code))]
    HelperFailure {
        command: String,
        args: Vec<String>,
        message: String,
        exit_code: Option<i32>,
    },

    /// Local certificate chain verification rejected a signing attempt
    #[error("signing policy violation: {message}")]
    PolicyViolation { message: String },

    /// Key parsing, signing or certificate encoding errors
    #[error("cryptographic operation '{operation}' failed: {message}")]
    Crypto { operation: String, message: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Malformed helper invocation
    #[error("usage error: {message}")]
    Usage { message: String },

    /// File system operations
    #[error("file system {operation} operation failed for '{}': {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAML deserialization errors
    #[error("YAML error: {message}")]
    Yaml {
        message: String,
        #[source]
        source: serde_yaml::Error,
    },
}

fn format_helper_error(
    command: &str,
    args: &[String],
    message: &str,
    exit_code: &Option<i32>,
) -> String {
    let args_str = args.join(" ");
    let invocation = if args_str.is_empty() {
        command.to_string()
    } else {
        format!("{command} {args_str}")
    };
    match exit_code {
        Some(code) => format!("helper '{invocation}' failed with exit code {code}: {message}"),
        None => format!("helper '{invocation}' failed: {message}"),
    }
}

impl Error {
    /// True when the signing identity is missing, so callers can offer to
    /// import or generate a key instead of retrying
    #[must_use]
    pub fn is_key_absent(&self) -> bool {
        matches!(self, Error::KeyAbsent { .. })
    }

    /// True for failures of the store or the helper transport
    #[must_use]
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            Error::Store { .. } | Error::HelperFailure { .. } | Error::FileSystem { .. }
        )
    }

    #[must_use]
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, Error::PolicyViolation { .. })
    }
}
