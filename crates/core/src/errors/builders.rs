//! Builder methods for creating errors with context

use super::types::Error;
use std::path::PathBuf;

impl Error {
    /// Create a secret store error
    #[must_use]
    pub fn store(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Store {
            operation: operation.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a secret store error with a source error
    #[must_use]
    pub fn store_with_source(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Store {
            operation: operation.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    #[must_use]
    pub fn already_exists(item: impl Into<String>) -> Self {
        Error::AlreadyExists { item: item.into() }
    }

    #[must_use]
    pub fn key_absent(message: impl Into<String>) -> Self {
        Error::KeyAbsent {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn certificate_missing(message: impl Into<String>) -> Self {
        Error::CertificateMissing {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn certificate_expired(message: impl Into<String>) -> Self {
        Error::CertificateExpired {
            message: message.into(),
        }
    }

    /// Create a helper failure (operational failure at the client boundary)
    #[must_use]
    pub fn helper_failure(
        command: impl Into<String>,
        args: Vec<String>,
        message: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Error::HelperFailure {
            command: command.into(),
            args,
            message: message.into(),
            exit_code,
        }
    }

    #[must_use]
    pub fn policy_violation(message: impl Into<String>) -> Self {
        Error::PolicyViolation {
            message: message.into(),
        }
    }

    /// Create a cryptographic error
    #[must_use]
    pub fn crypto(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Crypto {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn usage(message: impl Into<String>) -> Self {
        Error::Usage {
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }
}
