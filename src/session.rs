//! Wallet Session
//!
//! The owning aggregate for the active identity: holds decrypted key
//! material for its lifetime, walks the Empty/Generating/Importing/
//! Ready/Exporting state machine, and orchestrates the store.
//!
//! One logical wallet per session. Operations do not queue: while a
//! generate, import, or export is in flight, every conflicting call
//! fails immediately with `SessionBusy`. Seed stretching and store I/O
//! run on the blocking pool so callers can await them from interactive
//! contexts.

use std::fmt;
use std::sync::{Arc, RwLock};

use secp256k1::{Secp256k1, SecretKey};
use secrecy::SecretString;
use zeroize::Zeroizing;

use crate::error::{StoreError, WalletError, WalletResult};
use crate::log_info;
use crate::security::secure_compare_str;
use crate::store::{SecretRecord, SecretStore};
use crate::types::{Address, IdentitySummary, KeyPair, WalletIdentity};
use crate::wallet::entropy::{EntropySource, OsEntropy};
use crate::wallet::{self, derive_address, parse_phrase};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No identity held.
    Empty,
    /// A generate is stretching its seed.
    Generating,
    /// An import is deriving from a supplied phrase.
    Importing,
    /// An identity is active.
    Ready,
    /// An export is reading the retained phrase.
    Exporting,
}

impl SessionStatus {
    fn is_transitional(self) -> bool {
        matches!(
            self,
            SessionStatus::Generating | SessionStatus::Importing | SessionStatus::Exporting
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Empty => write!(f, "empty"),
            SessionStatus::Generating => write!(f, "generating"),
            SessionStatus::Importing => write!(f, "importing"),
            SessionStatus::Ready => write!(f, "ready"),
            SessionStatus::Exporting => write!(f, "exporting"),
        }
    }
}

struct SessionInner {
    status: SessionStatus,
    identity: Option<WalletIdentity>,
}

/// A single active wallet identity and the operations over it.
///
/// Share with `Arc` when several tasks need access; interior locking
/// keeps the state machine consistent.
pub struct WalletSession {
    inner: RwLock<SessionInner>,
    store: Arc<dyn SecretStore>,
    entropy: Arc<dyn EntropySource>,
}

impl WalletSession {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self::with_entropy_source(store, Arc::new(OsEntropy))
    }

    pub fn with_entropy_source(
        store: Arc<dyn SecretStore>,
        entropy: Arc<dyn EntropySource>,
    ) -> Self {
        Self {
            inner: RwLock::new(SessionInner {
                status: SessionStatus::Empty,
                identity: None,
            }),
            store,
            entropy,
        }
    }

    /// Create a fresh identity from new OS entropy.
    ///
    /// Moves through `Generating` and lands in `Ready` with the phrase
    /// retained for export. Nothing is persisted; call [`persist`]
    /// explicitly when the user opts in.
    ///
    /// [`persist`]: WalletSession::persist
    pub async fn generate(&self) -> WalletResult<IdentitySummary> {
        self.generate_with_passphrase(None).await
    }

    /// [`generate`] with an optional BIP39 passphrase mixed into the
    /// seed. The passphrase is not stored anywhere; restoring the same
    /// identity later needs both the phrase and the passphrase.
    ///
    /// [`generate`]: WalletSession::generate
    pub async fn generate_with_passphrase(
        &self,
        passphrase: Option<SecretString>,
    ) -> WalletResult<IdentitySummary> {
        let prev = self.begin(SessionStatus::Generating)?;

        let entropy_source = Arc::clone(&self.entropy);
        let built = run_blocking(move || {
            let entropy = entropy_source.entropy()?;
            let phrase = wallet::encode(&entropy)?;
            let (keypair, address) = wallet::derive_identity(&phrase, passphrase.as_ref())?;
            Ok(WalletIdentity::new(
                Some(phrase),
                keypair,
                address,
                chrono::Utc::now().timestamp(),
            ))
        })
        .await;

        match built {
            Ok(identity) => {
                let summary = self.finish(identity);
                log_info!("session", "Wallet generated", address = summary.address);
                Ok(summary)
            }
            Err(e) => {
                self.abort(prev);
                Err(e)
            }
        }
    }

    /// Decode a user-supplied phrase and adopt the identity it derives.
    ///
    /// Validation happens before the session is touched, so an invalid
    /// phrase fails fast and leaves the prior state (including any
    /// active identity) intact.
    pub async fn import(
        &self,
        words: &str,
        passphrase: Option<SecretString>,
    ) -> WalletResult<IdentitySummary> {
        let phrase = parse_phrase(words)?;
        let prev = self.begin(SessionStatus::Importing)?;

        let built = run_blocking(move || {
            let (keypair, address) = wallet::derive_identity(&phrase, passphrase.as_ref())?;
            Ok(WalletIdentity::new(
                Some(phrase),
                keypair,
                address,
                chrono::Utc::now().timestamp(),
            ))
        })
        .await;

        match built {
            Ok(identity) => {
                let summary = self.finish(identity);
                log_info!("session", "Wallet imported", address = summary.address);
                Ok(summary)
            }
            Err(e) => {
                self.abort(prev);
                Err(e)
            }
        }
    }

    /// Return the retained phrase for backup display.
    ///
    /// Only a `Ready` session that still holds its phrase can export;
    /// an empty session or a key-only restore reports
    /// `MnemonicUnavailable`. The caller owns the returned copy and it
    /// zeroizes on drop.
    pub fn export(&self) -> WalletResult<Zeroizing<String>> {
        let mut inner = self.inner.write().unwrap();
        if inner.status.is_transitional() {
            return Err(WalletError::SessionBusy);
        }
        if inner.status == SessionStatus::Empty {
            return Err(WalletError::MnemonicUnavailable);
        }

        inner.status = SessionStatus::Exporting;
        let result = inner
            .identity
            .as_ref()
            .and_then(|identity| identity.mnemonic())
            .map(|phrase| Zeroizing::new(phrase.as_str().to_owned()))
            .ok_or(WalletError::MnemonicUnavailable);
        inner.status = SessionStatus::Ready;
        result
    }

    /// Constant-time check of a typed phrase against the retained one,
    /// for backup confirmation screens.
    pub fn verify_phrase(&self, words: &str) -> WalletResult<bool> {
        let typed = parse_phrase(words)?;
        let inner = self.inner.read().unwrap();
        if inner.status.is_transitional() {
            return Err(WalletError::SessionBusy);
        }
        let identity = inner.identity.as_ref().ok_or(WalletError::SessionEmpty)?;
        let retained = identity.mnemonic().ok_or(WalletError::MnemonicUnavailable)?;
        Ok(secure_compare_str(retained.as_str(), typed.as_str()))
    }

    /// Drop the active identity, zeroizing key material and phrase.
    ///
    /// Idempotent on an empty session. Refused while an operation is in
    /// flight; the single-writer rule wins over unconditional clearing.
    pub fn clear(&self) -> WalletResult<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.status.is_transitional() {
            return Err(WalletError::SessionBusy);
        }
        inner.identity = None;
        inner.status = SessionStatus::Empty;
        Ok(())
    }

    /// Hand the current identity to the secret store.
    ///
    /// What survives depends on the backend: the keychain keeps only
    /// the key, the encrypted file keeps the phrase too.
    pub async fn persist(&self) -> WalletResult<()> {
        let record = {
            let inner = self.inner.read().unwrap();
            if inner.status.is_transitional() {
                return Err(WalletError::SessionBusy);
            }
            let identity = inner.identity.as_ref().ok_or(WalletError::SessionEmpty)?;
            record_from_identity(identity)
        };

        let store = Arc::clone(&self.store);
        run_blocking(move || store.store(&record).map_err(WalletError::from)).await?;
        log_info!("session", "Wallet persisted", backend = self.store.kind());
        Ok(())
    }

    /// Load a persisted identity, if any.
    ///
    /// `Ok(false)` means the store holds nothing, which is the normal
    /// first-run case. Corrupt blobs fail with their cause and stay on
    /// disk untouched; deciding what to do with them is the user's call.
    pub async fn restore(&self) -> WalletResult<bool> {
        let prev = self.begin(SessionStatus::Importing)?;

        let store = Arc::clone(&self.store);
        let loaded = run_blocking(move || match store.load() {
            Ok(record) => Ok(Some(record)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(WalletError::from(e)),
        })
        .await;

        match loaded {
            Ok(Some(record)) => match identity_from_record(record) {
                Ok(identity) => {
                    let summary = self.finish(identity);
                    log_info!("session", "Wallet restored", address = summary.address);
                    Ok(true)
                }
                Err(e) => {
                    self.abort(prev);
                    Err(e)
                }
            },
            Ok(None) => {
                self.abort(prev);
                Ok(false)
            }
            Err(e) => {
                self.abort(prev);
                Err(e)
            }
        }
    }

    /// Remove persisted data, then clear the in-memory identity.
    ///
    /// Destructive; callers invoke it only on explicit confirmation,
    /// never as error recovery.
    pub async fn purge(&self) -> WalletResult<()> {
        {
            let inner = self.inner.read().unwrap();
            if inner.status.is_transitional() {
                return Err(WalletError::SessionBusy);
            }
        }

        let store = Arc::clone(&self.store);
        run_blocking(move || store.clear().map_err(WalletError::from)).await?;
        log_info!("session", "Persisted wallet purged", backend = self.store.kind());
        self.clear()
    }

    /// Sign a payload with the active key: ECDSA over keccak256 of the
    /// payload, compact encoding, lowercase hex.
    pub fn sign(&self, payload: &[u8]) -> WalletResult<String> {
        let inner = self.inner.read().unwrap();
        if inner.status.is_transitional() {
            return Err(WalletError::SessionBusy);
        }
        let identity = inner.identity.as_ref().ok_or(WalletError::SessionEmpty)?;
        let signature = wallet::sign(identity.keypair(), payload);
        Ok(hex::encode(signature.serialize_compact()))
    }

    /// Canonical address of the active identity.
    pub fn address(&self) -> WalletResult<Address> {
        let inner = self.inner.read().unwrap();
        if inner.status.is_transitional() {
            return Err(WalletError::SessionBusy);
        }
        let identity = inner.identity.as_ref().ok_or(WalletError::SessionEmpty)?;
        Ok(identity.address().clone())
    }

    /// Public half of the active identity, as a summary.
    pub fn summary(&self) -> WalletResult<IdentitySummary> {
        let inner = self.inner.read().unwrap();
        if inner.status.is_transitional() {
            return Err(WalletError::SessionBusy);
        }
        let identity = inner.identity.as_ref().ok_or(WalletError::SessionEmpty)?;
        Ok(identity.summary())
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.read().unwrap().status
    }

    pub fn store_kind(&self) -> &'static str {
        self.store.kind()
    }

    /// Take the single-flight guard, recording the state to restore on
    /// failure.
    fn begin(&self, next: SessionStatus) -> WalletResult<SessionStatus> {
        let mut inner = self.inner.write().unwrap();
        if inner.status.is_transitional() {
            return Err(WalletError::SessionBusy);
        }
        let prev = inner.status;
        inner.status = next;
        Ok(prev)
    }

    /// Install a derived identity and release the guard. The previous
    /// identity, if any, drops and zeroizes here.
    fn finish(&self, identity: WalletIdentity) -> IdentitySummary {
        let summary = identity.summary();
        let mut inner = self.inner.write().unwrap();
        inner.identity = Some(identity);
        inner.status = SessionStatus::Ready;
        summary
    }

    /// Release the guard after a failed operation, restoring the prior
    /// state untouched.
    fn abort(&self, prev: SessionStatus) {
        let mut inner = self.inner.write().unwrap();
        inner.status = prev;
    }
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read().unwrap();
        f.debug_struct("WalletSession")
            .field("status", &inner.status)
            .field("store", &self.store.kind())
            .finish()
    }
}

async fn run_blocking<T>(task: impl FnOnce() -> WalletResult<T> + Send + 'static) -> WalletResult<T>
where
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(result) => result,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        // Cancellation only happens at runtime shutdown.
        Err(_) => Err(WalletError::SessionBusy),
    }
}

fn record_from_identity(identity: &WalletIdentity) -> SecretRecord {
    let secret = identity.keypair().secret_bytes();
    SecretRecord {
        mnemonic: identity
            .mnemonic()
            .map(|phrase| phrase.as_str().to_owned()),
        private_key: hex::encode(secret.as_slice()),
        created_at: identity.created_at(),
    }
}

/// Rebuild an identity from a stored record.
///
/// The stored key is authoritative; the phrase rides along for export
/// and is never re-derived from, so passphrase-derived identities
/// restore to the same address they were saved with.
fn identity_from_record(record: SecretRecord) -> WalletResult<WalletIdentity> {
    let secp = Secp256k1::new();

    let key_bytes = Zeroizing::new(
        hex::decode(&record.private_key)
            .map_err(|_| StoreError::Corrupt("private key encoding".into()))?,
    );
    let secret = SecretKey::from_slice(&key_bytes)
        .map_err(|_| StoreError::Corrupt("private key bytes".into()))?;
    let keypair = KeyPair::from_secret(&secp, secret);
    let address = derive_address(keypair.public_key());

    let phrase = match record.mnemonic.as_deref() {
        Some(words) => Some(
            parse_phrase(words)
                .map_err(|_| StoreError::Corrupt("stored mnemonic failed validation".into()))?,
        ),
        None => None,
    };

    Ok(WalletIdentity::new(
        phrase,
        keypair,
        address,
        record.created_at,
    ))
}
