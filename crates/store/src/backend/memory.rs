use super::{ItemKind, SecretStore, WriteMode};
use gem_keychain_core::{Error, Result, SecretBytes};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Process-local store, used for tests and in-process helpers
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<(ItemKind, String), SecretBytes>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemoryStore {
    fn get(&self, kind: ItemKind, account: &str) -> Result<Option<SecretBytes>> {
        Ok(self.items.read().get(&(kind, account.to_string())).cloned())
    }

    fn put(&self, kind: ItemKind, account: &str, value: &[u8], mode: WriteMode) -> Result<()> {
        let mut items = self.items.write();
        let key = (kind, account.to_string());
        if mode == WriteMode::CreateNew && items.contains_key(&key) {
            return Err(Error::already_exists(format!("{kind} '{account}'")));
        }
        items.insert(key, SecretBytes::new(value.to_vec()));
        Ok(())
    }

    fn delete(&self, kind: ItemKind, account: &str) -> Result<bool> {
        Ok(self
            .items
            .write()
            .remove(&(kind, account.to_string()))
            .is_some())
    }

    fn accounts(&self, kind: ItemKind) -> Result<Vec<String>> {
        Ok(self
            .items
            .read()
            .keys()
            .filter(|(item_kind, _)| *item_kind == kind)
            .map(|(_, account)| account.clone())
            .collect())
    }
}
