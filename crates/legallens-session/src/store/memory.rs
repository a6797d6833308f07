use std::sync::{Mutex, PoisonError};

use super::{CredentialPair, CredentialStore, StoreError};

#[derive(Default)]
pub struct MemoryCredentialStore {
    pair: Mutex<Option<CredentialPair>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(pair: CredentialPair) -> Self {
        Self {
            pair: Mutex::new(Some(pair)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<CredentialPair>, StoreError> {
        let guard = self.pair.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }

    fn set(&self, pair: &CredentialPair) -> Result<(), StoreError> {
        let mut guard = self.pair.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(pair.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut guard = self.pair.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
        Ok(())
    }

    fn swap_if(
        &self,
        expected: &CredentialPair,
        replacement: Option<&CredentialPair>,
    ) -> Result<bool, StoreError> {
        let mut guard = self.pair.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.as_ref() != Some(expected) {
            return Ok(false);
        }
        *guard = replacement.cloned();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_if_requires_expected_pair() {
        let store = MemoryCredentialStore::with_pair(CredentialPair::new("A1", "R1"));
        let stale = CredentialPair::new("A0", "R0");
        let renewed = CredentialPair::new("A2", "R1");

        assert!(!store.swap_if(&stale, Some(&renewed)).expect("swap"));
        assert_eq!(store.get().expect("get"), Some(CredentialPair::new("A1", "R1")));

        assert!(store
            .swap_if(&CredentialPair::new("A1", "R1"), Some(&renewed))
            .expect("swap"));
        assert_eq!(store.get().expect("get"), Some(renewed.clone()));

        store.clear().expect("clear");
        assert!(!store.swap_if(&renewed, None).expect("swap on empty"));
    }
}
