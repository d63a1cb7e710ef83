//! Unified error types for the wallet core.
//!
//! All fallible operations report through this taxonomy. Error text never
//! contains phrase words, key bytes, or passwords; mnemonic failures refer
//! to word positions only.

use thiserror::Error;

/// Why a mnemonic phrase was rejected.
///
/// These are recoverable: the caller re-prompts the user and tries again.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MnemonicError {
    /// Word count is not exactly 12.
    #[error("expected 12 words, got {0}")]
    WrongLength(usize),

    /// A word is absent from the dictionary. Carries the zero-based
    /// position, never the word itself.
    #[error("word at position {0} is not in the dictionary")]
    UnknownWord(usize),

    /// All words are valid but the embedded checksum disagrees with the
    /// final word. Rejected outright, never corrected.
    #[error("checksum mismatch")]
    ChecksumMismatch,
}

/// Secret store failures, shared by every backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Nothing stored. A valid empty state, not a fault; callers map this
    /// to "no wallet yet".
    #[error("no wallet stored")]
    NotFound,

    /// The OS declined access (permission prompt dismissed, locked
    /// keychain, unreadable file).
    #[error("storage access denied: {0}")]
    AccessDenied(String),

    /// The stored blob fails to deserialize or decrypt. Surfaced as
    /// "cannot restore wallet"; the blob is never deleted on this path.
    #[error("stored wallet data is corrupt: {0}")]
    Corrupt(String),

    /// Backend-specific failure outside the taxonomy above.
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("storage i/o error: {0}")]
    Io(std::io::Error),
}

/// Top-level error for wallet operations.
#[derive(Error, Debug)]
pub enum WalletError {
    /// The OS entropy source is unavailable. Fatal: there is no fallback
    /// to a weaker source.
    #[error("entropy source failed: {0}")]
    EntropySource(String),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(#[from] MnemonicError),

    /// The seed slice reduced to zero or >= the curve order, and the
    /// one-time tweak did too. Odds are negligible; treated as fatal.
    #[error("key derivation produced a degenerate scalar")]
    KeyDerivationDegenerate,

    #[error(transparent)]
    Storage(#[from] StoreError),

    /// Export was attempted while the session holds a keypair without a
    /// retained phrase (or no identity at all).
    #[error("mnemonic not available for export")]
    MnemonicUnavailable,

    /// The single-flight guard rejected a concurrent generate/import/export.
    #[error("another wallet operation is in flight")]
    SessionBusy,

    /// An accessor ran against a session with no active identity.
    #[error("no active wallet identity")]
    SessionEmpty,
}

/// Result type alias for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;
