use super::{ItemKind, SecretStore, WriteMode};
use gem_keychain_core::{Error, Result, SecretBytes};
use gem_keychain_utils::write_atomic;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory-backed store: `<root>/<kind>/<hex(account)>`, owner-only permissions.
///
/// Stands in for a platform store on machines without one. It provides no
/// encryption at rest beyond what the file system offers.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn kind_dir(&self, kind: ItemKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    fn item_path(&self, kind: ItemKind, account: &str) -> PathBuf {
        self.kind_dir(kind).join(hex::encode(account.as_bytes()))
    }
}

impl SecretStore for FileStore {
    fn get(&self, kind: ItemKind, account: &str) -> Result<Option<SecretBytes>> {
        let path = self.item_path(kind, account);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(SecretBytes::new(bytes))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::store_with_source(
                format!("read {kind}"),
                format!("cannot read '{}': {e}", path.display()),
                e,
            )),
        }
    }

    fn put(&self, kind: ItemKind, account: &str, value: &[u8], mode: WriteMode) -> Result<()> {
        let path = self.item_path(kind, account);
        if mode == WriteMode::CreateNew && self.get(kind, account)?.is_some() {
            return Err(Error::already_exists(format!("{kind} '{account}'")));
        }
        write_atomic(&path, value)
    }

    fn delete(&self, kind: ItemKind, account: &str) -> Result<bool> {
        let path = self.item_path(kind, account);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::store_with_source(
                format!("delete {kind}"),
                format!("cannot remove '{}': {e}", path.display()),
                e,
            )),
        }
    }

    fn accounts(&self, kind: ItemKind) -> Result<Vec<String>> {
        let dir = self.kind_dir(kind);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::store_with_source(
                    format!("list {kind}s"),
                    format!("cannot read '{}': {e}", dir.display()),
                    e,
                ))
            }
        };

        let mut accounts = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::file_system(&dir, "read directory entry", e))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            // Temporary files from in-flight atomic writes
            if name.starts_with('.') {
                continue;
            }
            match hex::decode(name.as_bytes()).ok().and_then(|raw| String::from_utf8(raw).ok()) {
                Some(account) => accounts.push(account),
                None => tracing::debug!(file = %name, "ignoring unrecognized file in store"),
            }
        }
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::conformance;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_conformance() {
        let temp_dir = TempDir::new().unwrap();
        conformance::run_all(&FileStore::new(temp_dir.path().join("store")));
    }

    #[test]
    fn test_accounts_survive_awkward_names() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        let host = "https://rubygems.pkg.github.com/acme/../x";
        store
            .put(ItemKind::Token, host, b"ghp_token", WriteMode::Overwrite)
            .unwrap();

        assert_eq!(store.accounts(ItemKind::Token).unwrap(), vec![host.to_string()]);
        // The account never becomes a path component
        assert!(!temp_dir.path().join("x").exists());
    }

    #[test]
    fn test_foreign_files_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        store
            .put(ItemKind::Token, "example", b"k", WriteMode::Overwrite)
            .unwrap();
        fs::write(temp_dir.path().join("api-keys").join("README"), "notes").unwrap();
        fs::write(temp_dir.path().join("api-keys").join(".abc.tmp"), "partial").unwrap();

        assert_eq!(store.accounts(ItemKind::Token).unwrap(), vec!["example".to_string()]);
    }

    #[test]
    fn test_unreadable_root_is_an_error_not_absence() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("store");
        fs::write(&blocker, "a file where the store directory should be").unwrap();
        let store = FileStore::new(&blocker);

        let err = store.get(ItemKind::Token, "example").unwrap_err();
        assert!(err.is_operational(), "{err}");
        assert!(store.accounts(ItemKind::Token).is_err());
        assert!(store
            .put(ItemKind::Token, "example", b"k", WriteMode::Overwrite)
            .is_err());
    }
}
