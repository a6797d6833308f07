//! Durable holder for the access/refresh credential pair.
//!
//! Every backend keeps the two values together: a successful `set` writes
//! both, `clear` removes both, and `get` only ever yields a complete pair.

mod file;
mod keyring;
mod memory;

use serde::{Deserialize, Serialize};

pub use self::file::FileCredentialStore;
pub use self::keyring::KeyringCredentialStore;
pub use self::memory::MemoryCredentialStore;
pub use crate::error::StoreError;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    #[serde(rename = "access_token")]
    pub access: String,
    #[serde(rename = "refresh_token")]
    pub refresh: String,
}

impl CredentialPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Result<Option<CredentialPair>, StoreError>;
    fn set(&self, pair: &CredentialPair) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;

    /// Writes `replacement` (or clears the store when it is `None`) only if
    /// the store still holds `expected`, as one step with respect to the
    /// other writers of this store. Returns whether the write happened.
    fn swap_if(
        &self,
        expected: &CredentialPair,
        replacement: Option<&CredentialPair>,
    ) -> Result<bool, StoreError>;

    fn access_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.get()?.map(|pair| pair.access))
    }
}

/// On-disk/keychain document. Both keys are optional on read so that a
/// hand-edited or truncated document degrades to "absent" instead of
/// yielding half a pair.
#[derive(Serialize, Deserialize, Default)]
struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

impl StoredCredentials {
    fn into_pair(self) -> Option<CredentialPair> {
        match (self.access_token, self.refresh_token) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Some(CredentialPair { access, refresh })
            }
            _ => None,
        }
    }
}

impl From<&CredentialPair> for StoredCredentials {
    fn from(pair: &CredentialPair) -> Self {
        Self {
            access_token: Some(pair.access.clone()),
            refresh_token: Some(pair.refresh.clone()),
        }
    }
}
