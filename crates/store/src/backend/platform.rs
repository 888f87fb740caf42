use super::{ItemKind, SecretStore, WriteMode};
use gem_keychain_core::{Error, Result, ResultExt, SecretBytes};
use keyring::Entry;
use std::collections::BTreeSet;

/// Account under which each service keeps the list of its accounts
const INDEX_ACCOUNT: &str = ".index";

/// The platform credential store (macOS Keychain, Windows Credential Manager,
/// Linux kernel keyring) through the `keyring` crate.
///
/// Platform stores cannot enumerate entries portably, so each item kind keeps
/// an index entry listing its accounts.
#[derive(Debug, Default)]
pub struct KeyringStore;

impl KeyringStore {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn entry(kind: ItemKind, account: &str) -> Result<Entry> {
        Entry::new(kind.service(), account).with_context(|| format!("open {kind} entry"))
    }

    fn read_index(kind: ItemKind) -> Result<BTreeSet<String>> {
        match Self::entry(kind, INDEX_ACCOUNT)?.get_secret() {
            Ok(raw) => serde_json::from_slice(&raw).map_err(|e| {
                Error::store(format!("read {kind} index"), format!("corrupt index: {e}"))
            }),
            Err(keyring::Error::NoEntry) => Ok(BTreeSet::new()),
            Err(e) => Err(Error::store_with_source(
                format!("read {kind} index"),
                e.to_string(),
                e,
            )),
        }
    }

    fn write_index(kind: ItemKind, accounts: &BTreeSet<String>) -> Result<()> {
        let raw = serde_json::to_vec(accounts)?;
        Self::entry(kind, INDEX_ACCOUNT)?
            .set_secret(&raw)
            .with_context(|| format!("write {kind} index"))
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, kind: ItemKind, account: &str) -> Result<Option<SecretBytes>> {
        // The index is bookkeeping, never an item
        if account == INDEX_ACCOUNT {
            return Ok(None);
        }
        match Self::entry(kind, account)?.get_secret() {
            Ok(bytes) => Ok(Some(SecretBytes::new(bytes))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(Error::store_with_source(
                format!("read {kind}"),
                e.to_string(),
                e,
            )),
        }
    }

    fn put(&self, kind: ItemKind, account: &str, value: &[u8], mode: WriteMode) -> Result<()> {
        if account == INDEX_ACCOUNT {
            return Err(Error::usage(format!("'{INDEX_ACCOUNT}' is a reserved name")));
        }
        if mode == WriteMode::CreateNew && self.get(kind, account)?.is_some() {
            return Err(Error::already_exists(format!("{kind} '{account}'")));
        }
        Self::entry(kind, account)?
            .set_secret(value)
            .with_context(|| format!("write {kind}"))?;

        let mut index = Self::read_index(kind)?;
        if index.insert(account.to_string()) {
            Self::write_index(kind, &index)?;
        }
        Ok(())
    }

    fn delete(&self, kind: ItemKind, account: &str) -> Result<bool> {
        if account == INDEX_ACCOUNT {
            return Ok(false);
        }
        let existed = match Self::entry(kind, account)?.delete_credential() {
            Ok(()) => true,
            Err(keyring::Error::NoEntry) => false,
            Err(e) => {
                return Err(Error::store_with_source(
                    format!("delete {kind}"),
                    e.to_string(),
                    e,
                ))
            }
        };

        let mut index = Self::read_index(kind)?;
        if index.remove(account) {
            Self::write_index(kind, &index)?;
        }
        Ok(existed)
    }

    fn accounts(&self, kind: ItemKind) -> Result<Vec<String>> {
        Ok(Self::read_index(kind)?.into_iter().collect())
    }
}
