//! Encrypted-file secret store.
//!
//! Fallback backend for hosts without a usable OS keychain. The record
//! is serialized, encrypted with AES-256-GCM under an Argon2id-derived
//! key, and written as a small versioned JSON blob. Salt and nonce are
//! freshly random per write, so saving the same record twice never
//! yields the same bytes.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::StoreError;
use crate::log_debug;
use crate::security::SecureBuffer;
use crate::store::{SecretRecord, SecretStore};

const BLOB_VERSION: u8 = 1;
const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// On-disk envelope. All binary fields are standard base64.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EncryptedBlob {
    /// Version for future compatibility.
    version: u8,
    /// Salt used for key derivation (32 bytes).
    salt: String,
    /// Nonce used for encryption (12 bytes).
    nonce: String,
    /// Ciphertext plus auth tag.
    ciphertext: String,
    /// Parameters the key was derived with; decryption honors these,
    /// not the current defaults.
    kdf_params: KdfParams,
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    /// Time cost (iterations).
    pub time_cost: u32,
    /// Parallelism.
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            // 64 MiB memory, 3 iterations, 4 parallel lanes
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// Reduced-cost parameters for tests and throwaway stores.
    pub fn fast() -> Self {
        Self {
            memory_cost: 64,
            time_cost: 1,
            parallelism: 1,
        }
    }
}

/// File-backed [`SecretStore`] keyed by a user password.
pub struct EncryptedFileStore {
    path: PathBuf,
    password: SecretString,
    kdf_params: KdfParams,
}

impl EncryptedFileStore {
    pub fn new(path: impl Into<PathBuf>, password: SecretString) -> Self {
        Self::with_kdf_params(path, password, KdfParams::default())
    }

    pub fn with_kdf_params(
        path: impl Into<PathBuf>,
        password: SecretString,
        kdf_params: KdfParams,
    ) -> Self {
        Self {
            path: path.into(),
            password,
            kdf_params,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SecretStore for EncryptedFileStore {
    fn store(&self, record: &SecretRecord) -> Result<(), StoreError> {
        if self.password.expose_secret().len() < 8 {
            return Err(StoreError::Backend(
                "store password must be at least 8 characters".into(),
            ));
        }

        let plaintext = SecureBuffer::from_vec(
            serde_json::to_vec(record).map_err(|e| StoreError::Backend(e.to_string()))?,
        );
        let blob = encrypt(&plaintext, &self.password, &self.kdf_params)?;
        let json =
            serde_json::to_string_pretty(&blob).map_err(|e| StoreError::Backend(e.to_string()))?;

        fs::write(&self.path, json).map_err(map_io_error)?;
        log_debug!("store", "Encrypted record written");
        Ok(())
    }

    fn load(&self) -> Result<SecretRecord, StoreError> {
        let json = fs::read_to_string(&self.path).map_err(map_io_error)?;
        let blob: EncryptedBlob =
            serde_json::from_str(&json).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        if blob.version != BLOB_VERSION {
            return Err(StoreError::Corrupt(format!(
                "unsupported blob version: {}",
                blob.version
            )));
        }

        let plaintext = decrypt(&blob, &self.password)?;
        serde_json::from_slice(&plaintext).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io_error(e)),
        }
    }

    fn kind(&self) -> &'static str {
        "encrypted-file"
    }
}

fn map_io_error(err: std::io::Error) -> StoreError {
    match err.kind() {
        ErrorKind::NotFound => StoreError::NotFound,
        ErrorKind::PermissionDenied => StoreError::AccessDenied(err.to_string()),
        _ => StoreError::Io(err),
    }
}

fn encrypt(
    plaintext: &[u8],
    password: &SecretString,
    kdf_params: &KdfParams,
) -> Result<EncryptedBlob, StoreError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(password, &salt, kdf_params)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_slice())
        .map_err(|e| StoreError::Backend(format!("cipher init failed: {e}")))?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| StoreError::Backend("encryption failed".into()))?;

    Ok(EncryptedBlob {
        version: BLOB_VERSION,
        salt: base64_encode(&salt),
        nonce: base64_encode(&nonce_bytes),
        ciphertext: base64_encode(&ciphertext),
        kdf_params: kdf_params.clone(),
    })
}

fn decrypt(blob: &EncryptedBlob, password: &SecretString) -> Result<SecureBuffer, StoreError> {
    let salt = base64_decode(&blob.salt)?;
    let nonce_bytes = base64_decode(&blob.nonce)?;
    let ciphertext = base64_decode(&blob.ciphertext)?;

    if salt.len() != SALT_LEN {
        return Err(StoreError::Corrupt("invalid salt length".into()));
    }
    if nonce_bytes.len() != NONCE_LEN {
        return Err(StoreError::Corrupt("invalid nonce length".into()));
    }

    let key = derive_key(password, &salt, &blob.kdf_params)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_slice())
        .map_err(|e| StoreError::Backend(format!("cipher init failed: {e}")))?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let plaintext = cipher.decrypt(nonce, ciphertext.as_ref()).map_err(|_| {
        StoreError::Corrupt("decryption failed: wrong password or corrupted data".into())
    })?;

    Ok(SecureBuffer::from_vec(plaintext))
}

fn derive_key(
    password: &SecretString,
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; 32]>, StoreError> {
    use argon2::{Algorithm, Argon2, Params, Version};

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(32),
    )
    .map_err(|e| StoreError::Backend(format!("invalid KDF params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(
            password.expose_secret().as_bytes(),
            salt,
            key.as_mut_slice(),
        )
        .map_err(|e| StoreError::Backend(format!("key derivation failed: {e}")))?;

    Ok(key)
}

fn base64_encode(data: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(data)
}

fn base64_decode(s: &str) -> Result<Vec<u8>, StoreError> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(s)
        .map_err(|e| StoreError::Corrupt(format!("invalid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_record() -> SecretRecord {
        SecretRecord {
            mnemonic: Some(
                "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"
                    .into(),
            ),
            private_key: "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc1"
                .into(),
            created_at: 1_700_000_000,
        }
    }

    fn store_at(dir: &TempDir, password: &str) -> EncryptedFileStore {
        EncryptedFileStore::with_kdf_params(
            dir.path().join("wallet.json.enc"),
            SecretString::from(password),
            KdfParams::fast(),
        )
    }

    #[test]
    fn roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, "correct horse battery");

        store.store(&sample_record()).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.mnemonic, sample_record().mnemonic);
        assert_eq!(loaded.private_key, sample_record().private_key);
        assert_eq!(loaded.created_at, 1_700_000_000);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, "correct horse battery");
        assert!(matches!(store.load(), Err(StoreError::NotFound)));
    }

    #[test]
    fn wrong_password_is_corrupt_and_preserves_file() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, "correct horse battery");
        store.store(&sample_record()).unwrap();

        let wrong = store_at(&dir, "incorrect zebra battery");
        assert!(matches!(wrong.load(), Err(StoreError::Corrupt(_))));

        // The blob must survive the failed read.
        assert!(store.path().exists());
        assert!(store.load().is_ok());
    }

    #[test]
    fn tampered_blob_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, "correct horse battery");
        store.store(&sample_record()).unwrap();

        let mut blob: EncryptedBlob =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        let mut raw = base64_decode(&blob.ciphertext).unwrap();
        raw[0] ^= 0xff;
        blob.ciphertext = base64_encode(&raw);
        fs::write(store.path(), serde_json::to_string(&blob).unwrap()).unwrap();

        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn garbage_file_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, "correct horse battery");
        fs::write(store.path(), "not json at all").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, "correct horse battery");

        store.store(&sample_record()).unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn short_password_rejected_on_store() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, "short");
        assert!(matches!(
            store.store(&sample_record()),
            Err(StoreError::Backend(_))
        ));
    }

    #[test]
    fn rewrites_use_fresh_salt_and_nonce() {
        let dir = TempDir::new().unwrap();
        let store = store_at(&dir, "correct horse battery");

        store.store(&sample_record()).unwrap();
        let first: EncryptedBlob =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();

        store.store(&sample_record()).unwrap();
        let second: EncryptedBlob =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();

        assert_ne!(first.salt, second.salt);
        assert_ne!(first.nonce, second.nonce);
        assert_ne!(first.ciphertext, second.ciphertext);
    }
}
