//! Host names that key api tokens
//!
//! Every host string crosses [`Host::parse`] exactly once. The default host is
//! spelled several ways by older tooling; all of them collapse to
//! [`Host::Default`], which travels over the protocol as "no host argument".

use crate::constants::{DEFAULT_HOST, DEFAULT_HOST_ALIASES};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A normalized token host
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Host {
    /// The unnamed rubygems.org entry
    #[default]
    Default,
    /// Any other host, stored verbatim after trimming
    Named(String),
}

impl Host {
    /// Normalize an optional raw host.
    ///
    /// Missing, blank and aliased values become [`Host::Default`].
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None => Host::Default,
            Some(name) if name.is_empty() || is_default_alias(name) => Host::Default,
            Some(name) => Host::Named(name.to_string()),
        }
    }

    /// The account name used inside the secret store
    #[must_use]
    pub fn account(&self) -> &str {
        match self {
            Host::Default => DEFAULT_HOST,
            Host::Named(name) => name,
        }
    }

    /// The positional argument sent to the helper, `None` for the default host
    #[must_use]
    pub fn argument(&self) -> Option<&str> {
        match self {
            Host::Default => None,
            Host::Named(name) => Some(name),
        }
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Host::Default)
    }
}

/// Whether `name` is one of the spellings of the default host
#[must_use]
pub fn is_default_alias(name: &str) -> bool {
    let name = name.trim();
    DEFAULT_HOST_ALIASES
        .iter()
        .any(|alias| alias.eq_ignore_ascii_case(name))
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.account())
    }
}

impl From<&str> for Host {
    fn from(raw: &str) -> Self {
        Host::parse(Some(raw))
    }
}

impl From<String> for Host {
    fn from(raw: String) -> Self {
        Host::parse(Some(&raw))
    }
}

impl From<Option<&str>> for Host {
    fn from(raw: Option<&str>) -> Self {
        Host::parse(raw)
    }
}

impl FromStr for Host {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Host::parse(Some(s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    #[case(Some("rubygems"))]
    #[case(Some("rubygems_api_key"))]
    #[case(Some("RubyGems"))]
    #[case(Some("RUBYGEMS_API_KEY"))]
    #[case(Some(" rubygems\n"))]
    fn test_default_spellings(#[case] raw: Option<&str>) {
        let host = Host::parse(raw);
        assert_eq!(host, Host::Default);
        assert_eq!(host.account(), "rubygems");
        assert_eq!(host.argument(), None);
    }

    #[rstest]
    #[case("https://rubygems.pkg.github.com/acme", "https://rubygems.pkg.github.com/acme")]
    #[case("  gems.example.com ", "gems.example.com")]
    #[case("rubygems.org", "rubygems.org")]
    #[case("rubygems_api_key_2", "rubygems_api_key_2")]
    fn test_named_hosts(#[case] raw: &str, #[case] account: &str) {
        let host = Host::from(raw);
        assert_eq!(host, Host::Named(account.to_string()));
        assert_eq!(host.account(), account);
        assert_eq!(host.argument(), Some(account));
    }

    #[test]
    fn test_display_uses_account() {
        assert_eq!(Host::Default.to_string(), "rubygems");
        assert_eq!(Host::from("example").to_string(), "example");
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(raw in "\\PC{0,40}") {
            let once = Host::parse(Some(&raw));
            let twice = Host::parse(once.argument());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn named_hosts_never_alias_default(raw in "[a-z0-9.:/-]{1,40}") {
            let host = Host::from(raw.as_str());
            prop_assert_eq!(host.is_default(), is_default_alias(&raw));
        }
    }
}
