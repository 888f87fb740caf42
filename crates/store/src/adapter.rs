//! Command dispatch for the helper process
//!
//! One [`HelperCommand`] in, one [`HelperExit`] out. Payload goes to `output`;
//! anything that should end up on stderr is returned as an `Error`.

use crate::backend::{ItemKind, SecretStore, WriteMode};
use crate::config::HelperConfig;
use crate::identity;
use crate::lifecycle::CertificateManager;
use gem_keychain_core::{trim_line_ending, Error, HelperCommand, HelperExit, Host, Result};
use std::io::{Read, Write};
use zeroize::Zeroizing;

/// Executes helper commands against a secret store
pub struct Adapter {
    store: Box<dyn SecretStore>,
    certificates: CertificateManager,
    key_bits: usize,
}

impl Adapter {
    pub fn new(
        store: Box<dyn SecretStore>,
        certificates: CertificateManager,
        key_bits: usize,
    ) -> Self {
        Self {
            store,
            certificates,
            key_bits,
        }
    }

    /// Build an adapter over the configured store
    pub fn from_config(config: &HelperConfig) -> Result<Self> {
        let store = config.open_store()?;
        let certificates = CertificateManager::new(config.certificate_settings()?);
        Ok(Self::new(store, certificates, config.key_bits))
    }

    pub fn store(&self) -> &dyn SecretStore {
        self.store.as_ref()
    }

    pub fn certificates(&self) -> &CertificateManager {
        &self.certificates
    }

    /// Run one command.
    ///
    /// `host` is ignored by commands that take none. `NotFound` is only ever
    /// returned by the query commands.
    pub fn execute(
        &self,
        command: HelperCommand,
        host: &Host,
        input: &mut dyn Read,
        output: &mut dyn Write,
    ) -> Result<HelperExit> {
        tracing::debug!(%command, %host, "executing helper command");
        let store = self.store.as_ref();

        let exit = match command {
            HelperCommand::HasToken => found(store.contains(ItemKind::Token, host.account())?),
            HelperCommand::GetToken => match store.get(ItemKind::Token, host.account())? {
                Some(secret) => {
                    output.write_all(&secret)?;
                    output.write_all(b"\n")?;
                    HelperExit::Success
                }
                None => HelperExit::NotFound,
            },
            HelperCommand::ListTokens => {
                let mut accounts = store.accounts(ItemKind::Token)?;
                accounts.sort();
                for account in accounts {
                    writeln!(output, "{account}")?;
                }
                HelperExit::Success
            }
            HelperCommand::SetToken => {
                let token = read_token(input)?;
                store.put(ItemKind::Token, host.account(), &token, WriteMode::Overwrite)?;
                tracing::info!(%host, "stored api key");
                HelperExit::Success
            }
            HelperCommand::RmToken => {
                let existed = store.delete(ItemKind::Token, host.account())?;
                tracing::info!(%host, existed, "removed api key");
                HelperExit::Success
            }
            HelperCommand::HasKey => found(identity::has_key(store)?),
            HelperCommand::ImportKey => {
                let pem = read_all(input)?;
                identity::import_key(store, &pem)?;
                HelperExit::Success
            }
            HelperCommand::GenerateKey => {
                identity::generate_key(store, self.key_bits)?;
                HelperExit::Success
            }
            HelperCommand::GetCert => {
                let pem = self.certificates.current_pem(store)?;
                output.write_all(pem.as_bytes())?;
                HelperExit::Success
            }
            HelperCommand::Sign => {
                let data = read_all(input)?;
                let key = self.certificates.require_valid(store)?;
                let signature = identity::sign(&key, &data)?;
                output.write_all(&signature)?;
                HelperExit::Success
            }
        };

        output.flush()?;
        Ok(exit)
    }
}

fn found(present: bool) -> HelperExit {
    if present {
        HelperExit::Success
    } else {
        HelperExit::NotFound
    }
}

fn read_all(input: &mut dyn Read) -> Result<Zeroizing<Vec<u8>>> {
    let mut buffer = Zeroizing::new(Vec::new());
    input.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// The first line of stdin without its line ending
fn read_token(input: &mut dyn Read) -> Result<Zeroizing<Vec<u8>>> {
    let buffer = read_all(input)?;
    let line = match buffer.iter().position(|&b| b == b'\n') {
        Some(end) => &buffer[..=end],
        None => &buffer[..],
    };
    let token = trim_line_ending(line);
    if token.is_empty() {
        return Err(Error::usage("expected the api key on standard input"));
    }
    Ok(Zeroizing::new(token.to_vec()))
}
