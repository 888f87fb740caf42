//! Argument vectors for helper invocations

use std::fmt;

/// The argv tail of one helper invocation: the command word, then the host
/// when there is one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArguments(Vec<String>);

impl CommandArguments {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn from_vec(args: Vec<String>) -> Self {
        Self(args)
    }

    pub fn push(&mut self, arg: impl Into<String>) {
        self.0.push(arg.into());
    }

    /// The command word
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// The positional host, absent for the default host
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for CommandArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

impl<S: Into<String>> FromIterator<S> for CommandArguments {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
