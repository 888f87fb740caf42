//! Core domain types, protocol definitions and errors for `gem-keychain`.
//!
//! Everything that both sides of the helper boundary must agree on lives here:
//! the command vocabulary, the exit-code contract, the canonical host
//! normalization and the error taxonomy.
//!
//! ## Key Components
//!
//! - **`errors`**: The crate-wide `Error` enum and `Result` alias.
//! - **`protocol`**: `HelperCommand`, `HelperExit`, and the request/result
//!   pair exchanged with the helper process.
//! - **`types`**: `Host` normalization, secret buffers and argument wrappers.
//! - **`constants`**: Store service names, environment variables and defaults.

pub mod constants;
pub mod errors;
pub mod protocol;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result, ResultExt},
    protocol::{trim_line_ending, CommandRequest, CommandResult, HelperCommand, HelperExit},
    types::*,
};
