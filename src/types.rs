//! Shared types for the wallet core.
//!
//! Data structures that cross module boundaries are defined here. Sensitive
//! types zero their contents on drop and redact themselves in `Debug`
//! output, so accidental `{:?}` formatting can never leak key material.

use secp256k1::{PublicKey, Secp256k1, SecretKey, Signing};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Entropy length in bytes for a 12-word mnemonic (128 bits).
pub const ENTROPY_LEN: usize = 16;

/// BIP39 seed length in bytes (512 bits).
pub const SEED_LEN: usize = 64;

/// Expected word count for every phrase this core accepts.
pub const WORD_COUNT: usize = 12;

// =============================================================================
// Sensitive value types
// =============================================================================

/// Raw wallet entropy, 128 bits.
///
/// Created once per generation event, consumed immediately by the mnemonic
/// codec, never persisted. Zeroed on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Entropy([u8; ENTROPY_LEN]);

impl Entropy {
    pub fn from_bytes(bytes: [u8; ENTROPY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ENTROPY_LEN] {
        &self.0
    }
}

impl fmt::Debug for Entropy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Entropy([REDACTED])")
    }
}

/// 512-bit seed stretched from (mnemonic, passphrase).
///
/// Pure function of its inputs; the same phrase and passphrase always
/// reproduce the same seed on any platform. Zeroed on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_LEN]);

impl Seed {
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed([REDACTED])")
    }
}

/// A validated 12-word phrase in canonical form: lowercase dictionary
/// words joined by single spaces, byte-identical to dictionary entries.
///
/// Only the mnemonic codec constructs these. Zeroed on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MnemonicPhrase(String);

impl MnemonicPhrase {
    /// Caller must have validated and canonicalized the phrase already.
    pub(crate) fn new_unchecked(phrase: String) -> Self {
        Self(phrase)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ')
    }

    pub fn word_count(&self) -> usize {
        self.words().count()
    }
}

impl fmt::Debug for MnemonicPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MnemonicPhrase([REDACTED])")
    }
}

// =============================================================================
// Key material
// =============================================================================

/// secp256k1 keypair derived from a seed.
///
/// The secret half never appears in `Debug` output and is erased on drop.
/// The relation `public = secret * G` holds by construction.
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    pub fn from_secret<C: Signing>(secp: &Secp256k1<C>, secret: SecretKey) -> Self {
        let public = secret.public_key(secp);
        Self { secret, public }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Uncompressed SEC1 encoding, 65 bytes with the 0x04 prefix.
    pub fn public_uncompressed(&self) -> [u8; 65] {
        self.public.serialize_uncompressed()
    }

    /// Secret scalar bytes, wrapped so the copy is zeroed when dropped.
    pub(crate) fn secret_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.secret.secret_bytes())
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.secret
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.secret.non_secure_erase();
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("secret", &"[REDACTED]")
            .field("public", &self.public)
            .finish()
    }
}

// =============================================================================
// Address
// =============================================================================

/// Chain address in canonical form: `0x` followed by 40 lowercase hex
/// characters. Derived one-way from the public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Caller guarantees canonical formatting; the address deriver and the
    /// format validator are the only constructors.
    pub(crate) fn from_canonical(address: String) -> Self {
        Self(address)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Identity aggregate
// =============================================================================

/// The in-memory aggregate for an active wallet.
///
/// Created by generate or import, or rebuilt from the secret store. The
/// mnemonic is retained only when the creating flow had one; a key-only
/// restore (keychain backend) leaves it absent and export unavailable.
/// Dropping the aggregate zeroes both sensitive fields.
pub struct WalletIdentity {
    mnemonic: Option<MnemonicPhrase>,
    keypair: KeyPair,
    address: Address,
    created_at: i64,
}

impl WalletIdentity {
    pub(crate) fn new(
        mnemonic: Option<MnemonicPhrase>,
        keypair: KeyPair,
        address: Address,
        created_at: i64,
    ) -> Self {
        Self {
            mnemonic,
            keypair,
            address,
            created_at,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn public_key(&self) -> &PublicKey {
        self.keypair.public_key()
    }

    pub fn has_mnemonic(&self) -> bool {
        self.mnemonic.is_some()
    }

    /// Unix timestamp of the creating event.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub(crate) fn mnemonic(&self) -> Option<&MnemonicPhrase> {
        self.mnemonic.as_ref()
    }

    pub(crate) fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    /// Non-sensitive projection for callers and serialization.
    pub fn summary(&self) -> IdentitySummary {
        IdentitySummary {
            address: self.address.clone(),
            checksum_address: crate::wallet::checksum_address(&self.address),
            public_key: hex::encode(&self.keypair.public_uncompressed()[1..]),
            created_at: self.created_at,
            has_mnemonic: self.mnemonic.is_some(),
        }
    }
}

impl fmt::Debug for WalletIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletIdentity")
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "[REDACTED]"))
            .field("address", &self.address)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Public identity facts, safe to display, log, and serialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySummary {
    /// Canonical lowercase address.
    pub address: Address,
    /// EIP-55 mixed-case display form of the same address.
    pub checksum_address: String,
    /// Uncompressed public key, 64 bytes hex, prefix byte stripped.
    pub public_key: String,
    /// Unix timestamp of the creating event.
    pub created_at: i64,
    /// Whether `export()` can return a phrase for this identity.
    pub has_mnemonic: bool,
}
