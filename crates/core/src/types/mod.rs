//! Core domain types for gem-keychain.
//!
//! - **`commands`**: argument lists passed to the helper process
//! - **`environment`**: environment overrides for the helper process
//! - **`host`**: canonical host normalization, including default-host aliases
//! - **`secret`**: zeroizing buffers for secret material

pub mod commands;
pub mod environment;
pub mod host;
pub mod secret;

pub use commands::*;
pub use environment::*;
pub use host::*;
pub use secret::*;
