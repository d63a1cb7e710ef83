//! Wallet Core Library
//!
//! Deterministic single-identity wallet engine: BIP39 phrase handling,
//! seed and key derivation, address derivation, payload signing, and
//! pluggable secret persistence.
//!
//! # Architecture
//!
//! - **wallet**: entropy, the mnemonic codec, key/address derivation,
//!   and interactive input validation
//! - **session**: the owning state machine for the active identity
//!   (generate / import / export / clear / persist / restore / sign)
//! - **store**: secret persistence backends (OS keychain, encrypted
//!   file, in-memory)
//! - **security** / **utils**: zeroization helpers and redacting logs
//!
//! All state lives in an explicit [`WalletSession`] value the caller
//! owns; there is no ambient singleton.
//!
//! # Security
//!
//! Sensitive values (`Entropy`, `Seed`, `MnemonicPhrase`, key material)
//! zero themselves on drop and redact themselves in `Debug` output.
//! Error messages carry word positions and backend names, never phrase
//! words, key bytes, or passwords.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wallet_core::{MemoryStore, WalletSession};
//!
//! let session = WalletSession::new(Arc::new(MemoryStore::new()));
//! let summary = session.generate().await?;
//! println!("address: {}", summary.checksum_address);
//! session.persist().await?;
//! ```

pub mod error;
pub mod security;
pub mod session;
pub mod store;
pub mod types;
pub mod utils;
pub mod wallet;

// Re-export the surface most callers need
pub use error::{MnemonicError, StoreError, WalletError, WalletResult};
pub use session::{SessionStatus, WalletSession};
pub use store::{EncryptedFileStore, KdfParams, KeychainStore, MemoryStore, SecretRecord, SecretStore};
pub use types::{
    Address, Entropy, IdentitySummary, KeyPair, MnemonicPhrase, Seed, WalletIdentity,
};
pub use wallet::{
    checksum_address, decode, derive_address, derive_identity, encode, is_valid_address_format,
    is_valid_phrase, is_valid_word, keccak256, parse_phrase, sign, suggest_words, validate_phrase,
    verify,
};
