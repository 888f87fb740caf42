//! Extension traits for error handling

use super::types::{Error, Result};

/// Extension trait for attributing backend failures to a store operation
pub trait ResultExt<T> {
    /// Wrap the error as a store failure of `operation`
    fn context(self, operation: impl Into<String>) -> Result<T>;

    /// Add context with a lazily built operation name
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, operation: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::store_with_source(operation, e.to_string(), e))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| Error::store_with_source(f(), e.to_string(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_wraps_as_store_error() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "keychain locked",
        ));
        let err = result.context("read api-key").unwrap_err();
        assert!(err.is_operational());
        assert_eq!(
            err.to_string(),
            "secret store read api-key failed: keychain locked"
        );
    }
}
