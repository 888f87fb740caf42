//! Owner-only file writes that never leave a half-written secret behind

use gem_keychain_core::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Staging file next to its destination, removed on drop unless committed
struct Staged {
    path: PathBuf,
    committed: bool,
}

impl Staged {
    fn open(dir: &Path) -> Result<(Self, File)> {
        let path = dir.join(format!(".{}.staged", Uuid::new_v4().simple()));
        let mut options = OpenOptions::new();
        options.create_new(true).write(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let file = options
            .open(&path)
            .map_err(|e| Error::file_system(&path, "stage secret", e))?;
        Ok((
            Self {
                path,
                committed: false,
            },
            file,
        ))
    }

    fn commit(mut self, dest: &Path) -> Result<()> {
        fs::rename(&self.path, dest).map_err(|e| Error::file_system(dest, "replace secret", e))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for Staged {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Replace `path` with `content` in one rename; readers see the old bytes or
/// the new ones. The file is readable by the owner only.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    create_private_dir(dir)?;

    let (staged, mut file) = Staged::open(dir)?;
    file.write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| Error::file_system(&staged.path, "stage secret", e))?;
    drop(file);
    staged.commit(path)
}

/// Create `path` and any missing parents, accessible by the owner only
pub fn create_private_dir(path: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
        .create(path)
        .map_err(|e| Error::file_system(path, "create directory", e))
}
