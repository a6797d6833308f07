use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use super::{CredentialPair, CredentialStore, StoreError, StoredCredentials};

pub const CREDENTIALS_FILENAME: &str = "credentials.json";

/// Credential pair persisted as a single JSON document. Writes land in a
/// sibling temp file that is renamed over the target.
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CREDENTIALS_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileCredentialStore {
    fn read(&self) -> Result<Option<CredentialPair>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if contents.trim().is_empty() {
            return Ok(None);
        }
        let stored: StoredCredentials = serde_json::from_str(&contents)?;
        Ok(stored.into_pair())
    }

    // Callers hold `write_lock`.
    fn write(&self, pair: &CredentialPair) -> Result<(), StoreError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;
        let contents = serde_json::to_vec_pretty(&StoredCredentials::from(pair))?;
        let mut file = tempfile::NamedTempFile::new_in(parent)?;
        file.write_all(&contents)?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|err| err.error)?;
        debug!(path = %self.path.display(), "stored credentials");
        Ok(())
    }

    // Callers hold `write_lock`.
    fn remove(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "cleared credentials");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Result<Option<CredentialPair>, StoreError> {
        self.read()
    }

    fn set(&self, pair: &CredentialPair) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write(pair)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.remove()
    }

    fn swap_if(
        &self,
        expected: &CredentialPair,
        replacement: Option<&CredentialPair>,
    ) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.read()?.as_ref() != Some(expected) {
            debug!(path = %self.path.display(), "stored credentials changed; skipping write");
            return Ok(false);
        }
        match replacement {
            Some(pair) => self.write(pair)?,
            None => self.remove()?,
        }
        Ok(true)
    }
}
