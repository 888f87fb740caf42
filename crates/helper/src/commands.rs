//! Command line grammar of the helper

use clap::Subcommand;
use gem_keychain_core::{HelperCommand, Host};

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Exit 0 if an api key is stored for HOST, 1 if not
    HasToken {
        /// Host the key belongs to, the rubygems.org default if omitted
        host: Option<String>,
    },
    /// Print the api key stored for HOST
    GetToken { host: Option<String> },
    /// Print every host with a stored api key, one per line
    ListTokens,
    /// Store the api key read from the first line of stdin
    SetToken { host: Option<String> },
    /// Remove the api key for HOST
    RmToken { host: Option<String> },
    /// Exit 0 if a signing key is stored, 1 if not
    HasKey,
    /// Store the PEM private key read from stdin
    ImportKey,
    /// Generate and store a new signing key
    GenerateKey,
    /// Print the signing certificate as PEM, issuing a new one if needed
    GetCert,
    /// Sign stdin and print the raw signature
    Sign,
}

impl Commands {
    /// The protocol command and its normalized host
    pub fn into_request(self) -> (HelperCommand, Host) {
        match self {
            Commands::HasToken { host } => (HelperCommand::HasToken, Host::parse(host.as_deref())),
            Commands::GetToken { host } => (HelperCommand::GetToken, Host::parse(host.as_deref())),
            Commands::ListTokens => (HelperCommand::ListTokens, Host::Default),
            Commands::SetToken { host } => (HelperCommand::SetToken, Host::parse(host.as_deref())),
            Commands::RmToken { host } => (HelperCommand::RmToken, Host::parse(host.as_deref())),
            Commands::HasKey => (HelperCommand::HasKey, Host::Default),
            Commands::ImportKey => (HelperCommand::ImportKey, Host::Default),
            Commands::GenerateKey => (HelperCommand::GenerateKey, Host::Default),
            Commands::GetCert => (HelperCommand::GetCert, Host::Default),
            Commands::Sign => (HelperCommand::Sign, Host::Default),
        }
    }
}
