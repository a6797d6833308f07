#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::OnceLock;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use super::{CredentialPair, CredentialStore, StoreError, StoredCredentials};

pub const KEYRING_SERVICE: &str = "legallens";
pub const KEYRING_ENTRY: &str = "session";

/// OS keychain backend. The pair is serialized into one entry so both
/// values are written and removed together. Writers in this process are
/// serialized so `swap_if` cannot interleave with `set` or `clear`.
pub struct KeyringCredentialStore {
    service: String,
    entry: String,
    write_lock: Mutex<()>,
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new(KEYRING_SERVICE, KEYRING_ENTRY)
    }
}

impl KeyringCredentialStore {
    pub fn new(service: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            entry: entry.into(),
            write_lock: Mutex::new(()),
        }
    }
}

impl KeyringCredentialStore {
    fn read(&self) -> Result<Option<CredentialPair>, StoreError> {
        let Some(raw) = keyring_get(&self.service, &self.entry)? else {
            return Ok(None);
        };
        let stored: StoredCredentials = serde_json::from_str(&raw)?;
        Ok(stored.into_pair())
    }

    fn write(&self, pair: &CredentialPair) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&StoredCredentials::from(pair))?;
        keyring_set(&self.service, &self.entry, &raw)?;
        debug!(service = %self.service, "stored credentials in keyring");
        Ok(())
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self) -> Result<Option<CredentialPair>, StoreError> {
        self.read()
    }

    fn set(&self, pair: &CredentialPair) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write(pair)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        keyring_delete(&self.service, &self.entry)
    }

    fn swap_if(
        &self,
        expected: &CredentialPair,
        replacement: Option<&CredentialPair>,
    ) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.read()?.as_ref() != Some(expected) {
            return Ok(false);
        }
        match replacement {
            Some(pair) => self.write(pair)?,
            None => keyring_delete(&self.service, &self.entry)?,
        }
        Ok(true)
    }
}

#[cfg(not(test))]
fn keyring_entry(service: &str, entry: &str) -> Result<keyring::Entry, StoreError> {
    keyring::Entry::new(service, entry).map_err(|err| StoreError::Keyring(err.to_string()))
}

#[cfg(not(test))]
fn keyring_set(service: &str, entry: &str, value: &str) -> Result<(), StoreError> {
    keyring_entry(service, entry)?
        .set_password(value)
        .map_err(|err| StoreError::Keyring(format!("failed to store credentials: {err}")))
}

#[cfg(not(test))]
fn keyring_get(service: &str, entry: &str) -> Result<Option<String>, StoreError> {
    match keyring_entry(service, entry)?.get_password() {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(StoreError::Keyring(format!(
            "failed to load credentials from keychain: {err}"
        ))),
    }
}

#[cfg(not(test))]
fn keyring_delete(service: &str, entry: &str) -> Result<(), StoreError> {
    match keyring_entry(service, entry)?.delete_password() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(err) => Err(StoreError::Keyring(format!(
            "failed to delete credentials: {err}"
        ))),
    }
}

#[cfg(test)]
fn keyring_mock() -> &'static Mutex<HashMap<String, String>> {
    static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
    STORE.get_or_init(|| Mutex::new(HashMap::new()))
}

#[cfg(test)]
fn keyring_key(service: &str, entry: &str) -> String {
    format!("{service}::{entry}")
}

#[cfg(test)]
fn keyring_set(service: &str, entry: &str, value: &str) -> Result<(), StoreError> {
    let mut store = keyring_mock()
        .lock()
        .map_err(|_| StoreError::Keyring("failed to lock keyring mock".to_string()))?;
    store.insert(keyring_key(service, entry), value.to_string());
    Ok(())
}

#[cfg(test)]
fn keyring_get(service: &str, entry: &str) -> Result<Option<String>, StoreError> {
    let store = keyring_mock()
        .lock()
        .map_err(|_| StoreError::Keyring("failed to lock keyring mock".to_string()))?;
    Ok(store.get(&keyring_key(service, entry)).cloned())
}

#[cfg(test)]
fn keyring_delete(service: &str, entry: &str) -> Result<(), StoreError> {
    let mut store = keyring_mock()
        .lock()
        .map_err(|_| StoreError::Keyring("failed to lock keyring mock".to_string()))?;
    store.remove(&keyring_key(service, entry));
    Ok(())
}
