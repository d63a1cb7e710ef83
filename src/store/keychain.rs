//! OS keychain secret store.
//!
//! One credential entry per (service, account) pair, resolved at
//! construction and reused for every call. Only the private key and
//! creation time are persisted; OS secret-size limits make the phrase
//! a poor fit here, so identities restored from this backend cannot
//! re-export their mnemonic.
//!
//! Every call can pop an OS consent prompt and block until the user
//! answers it.

use keyring::Entry;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::error::StoreError;
use crate::log_debug;
use crate::store::{SecretRecord, SecretStore};

pub const DEFAULT_SERVICE: &str = "wallet-core";
pub const DEFAULT_ACCOUNT: &str = "primary";

/// What actually lands in the credential manager. Deliberately smaller
/// than [`SecretRecord`]: no mnemonic.
#[derive(Serialize, Deserialize, Zeroize)]
struct KeychainPayload {
    private_key: String,
    #[zeroize(skip)]
    created_at: i64,
}

/// [`SecretStore`] backed by the platform credential manager.
pub struct KeychainStore {
    service: String,
    entry: Entry,
}

impl KeychainStore {
    pub fn new() -> Result<Self, StoreError> {
        Self::with_names(DEFAULT_SERVICE, DEFAULT_ACCOUNT)
    }

    /// Separate names keep multiple wallets (or test runs) from
    /// clobbering each other. The entry is resolved once and shared by
    /// `store`/`load`/`clear`; keyring's mock backend scopes credential
    /// state to the entry instance.
    pub fn with_names(
        service: impl Into<String>,
        account: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let service = service.into();
        let entry = Entry::new(&service, &account.into()).map_err(map_keyring_error)?;
        Ok(Self { service, entry })
    }
}

impl SecretStore for KeychainStore {
    fn store(&self, record: &SecretRecord) -> Result<(), StoreError> {
        let mut payload = KeychainPayload {
            private_key: record.private_key.clone(),
            created_at: record.created_at,
        };
        let json = Zeroizing::new(
            serde_json::to_string(&payload).map_err(|e| StoreError::Backend(e.to_string()))?,
        );
        payload.zeroize();

        self.entry
            .set_password(&json)
            .map_err(map_keyring_error)?;
        log_debug!("store", "Credential written", service = self.service);
        Ok(())
    }

    fn load(&self) -> Result<SecretRecord, StoreError> {
        let json = Zeroizing::new(self.entry.get_password().map_err(map_keyring_error)?);
        let mut payload: KeychainPayload = serde_json::from_str(&json)
            .map_err(|e| StoreError::Corrupt(format!("credential payload: {e}")))?;

        let record = SecretRecord {
            mnemonic: None,
            private_key: payload.private_key.clone(),
            created_at: payload.created_at,
        };
        payload.zeroize();
        Ok(record)
    }

    fn clear(&self) -> Result<(), StoreError> {
        match self.entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(map_keyring_error(e)),
        }
    }

    fn kind(&self) -> &'static str {
        "keychain"
    }
}

fn map_keyring_error(err: keyring::Error) -> StoreError {
    match err {
        keyring::Error::NoEntry => StoreError::NotFound,
        keyring::Error::NoStorageAccess(inner) => StoreError::AccessDenied(inner.to_string()),
        keyring::Error::PlatformFailure(inner) => StoreError::Backend(inner.to_string()),
        keyring::Error::BadEncoding(_) => StoreError::Corrupt("credential encoding".into()),
        other => StoreError::Backend(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    static MOCK: Once = Once::new();

    /// Route keyring calls to its in-process mock store. Process-wide,
    /// so set exactly once.
    fn use_mock_store() {
        MOCK.call_once(|| {
            keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        });
    }

    fn record() -> SecretRecord {
        SecretRecord {
            mnemonic: Some("legal winner thank year".into()),
            private_key: "7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f"
                .into(),
            created_at: 1_690_000_000,
        }
    }

    #[test]
    fn roundtrip_strips_the_mnemonic() {
        use_mock_store();
        let store = KeychainStore::with_names("wallet-core-test", "roundtrip").unwrap();

        store.store(&record()).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.mnemonic, None);
        assert_eq!(loaded.private_key, record().private_key);
        assert_eq!(loaded.created_at, 1_690_000_000);

        store.clear().unwrap();
        assert!(matches!(store.load(), Err(StoreError::NotFound)));
    }

    #[test]
    fn missing_credential_is_not_found() {
        use_mock_store();
        let store = KeychainStore::with_names("wallet-core-test", "missing").unwrap();
        assert!(matches!(store.load(), Err(StoreError::NotFound)));
    }

    #[test]
    fn clear_is_idempotent() {
        use_mock_store();
        let store = KeychainStore::with_names("wallet-core-test", "clear-twice").unwrap();

        store.store(&record()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(matches!(store.load(), Err(StoreError::NotFound)));
    }
}
