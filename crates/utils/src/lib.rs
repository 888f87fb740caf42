//! Shared utilities for gem-keychain
//!
//! Path resolution, atomic file writes and logging setup used by both the
//! helper binary and the client library.

pub mod atomic_file;
pub mod logging;
pub mod xdg;

pub use atomic_file::*;
pub use xdg::*;
