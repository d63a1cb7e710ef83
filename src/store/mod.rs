//! Secret Store
//!
//! The persistence boundary for wallet secrets. A backend is chosen at
//! construction time and injected into the session; core logic never
//! branches on which one is behind the trait.
//!
//! Available backends:
//! - [`KeychainStore`]: the OS credential manager (key material only)
//! - [`EncryptedFileStore`]: AES-256-GCM file blob for hosts without a
//!   usable keychain
//! - [`MemoryStore`]: process-local, for tests and ephemeral sessions

mod encrypted_file;
mod keychain;
mod memory;

pub use encrypted_file::{EncryptedFileStore, KdfParams};
pub use keychain::KeychainStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::StoreError;

/// The unit of persistence handed to a backend.
///
/// Field names are the compatibility contract for stored blobs. The
/// mnemonic is optional: backends with tight secret-size limits persist
/// only the key, and identities restored from them cannot re-export
/// their phrase.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SecretRecord {
    /// Canonical 12-word phrase, when the backend retains it.
    pub mnemonic: Option<String>,
    /// Private scalar, lowercase hex.
    pub private_key: String,
    /// Unix timestamp of identity creation.
    #[zeroize(skip)]
    pub created_at: i64,
}

impl std::fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretRecord")
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "[REDACTED]"))
            .field("private_key", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Capability set every backend provides.
///
/// `load` returning [`StoreError::NotFound`] is the normal first-run
/// case, not a failure. Corrupt or undecryptable blobs surface as
/// [`StoreError::Corrupt`] and are left in place; no backend deletes
/// data on a failed read. Keychain calls can block on an OS consent
/// prompt, so callers treat `store` and `load` as long-running.
pub trait SecretStore: Send + Sync {
    /// Persist a record, replacing any previous one.
    fn store(&self, record: &SecretRecord) -> Result<(), StoreError>;

    /// Load the persisted record.
    fn load(&self) -> Result<SecretRecord, StoreError>;

    /// Remove persisted data. Succeeds when nothing is stored.
    fn clear(&self) -> Result<(), StoreError>;

    /// Backend label for logs. Never used for branching.
    fn kind(&self) -> &'static str;
}
