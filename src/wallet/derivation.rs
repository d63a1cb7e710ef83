//! Key Derivation Engine
//!
//! The deterministic path from phrase to signing key:
//! phrase (+ optional passphrase) -> 512-bit seed -> secp256k1 keypair.
//!
//! SECURITY: derivation is byte-identical on every platform. The
//! cross-device restore contract depends on it, so nothing here may
//! branch on OS, locale, or configuration.

use bip39::{Language, Mnemonic};
use hmac::{Hmac, Mac};
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha512;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use crate::error::{MnemonicError, WalletError, WalletResult};
use crate::types::{KeyPair, MnemonicPhrase, Seed};
use crate::wallet::address::keccak256;

type HmacSha512 = Hmac<Sha512>;

/// Domain tag for the single retry when seed bytes miss the curve order.
const KEY_TWEAK_DOMAIN: &[u8] = b"wallet-core/scalar-tweak/v1";

/// Stretch a phrase into the 64-byte seed.
///
/// PBKDF2-HMAC-SHA512, 2048 iterations, salt `"mnemonic" + passphrase`.
/// Deliberately slow; callers keep this off interactive threads.
pub fn derive_seed(
    phrase: &MnemonicPhrase,
    passphrase: Option<&SecretString>,
) -> WalletResult<Seed> {
    // Canonical phrases always re-parse; a failure here means the phrase
    // bypassed the codec.
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase.as_str())
        .map_err(|_| WalletError::InvalidMnemonic(MnemonicError::ChecksumMismatch))?;

    // The passphrase is NFKD-normalized per the derivation contract;
    // the phrase itself is already canonical.
    let normalized_passphrase: Zeroizing<String> = match passphrase {
        Some(secret) => Zeroizing::new(secret.expose_secret().nfkd().collect()),
        None => Zeroizing::new(String::new()),
    };
    let seed = Zeroizing::new(mnemonic.to_seed_normalized(&normalized_passphrase));
    Ok(Seed::from_bytes(*seed))
}

/// Interpret the first 32 seed bytes as the private scalar.
///
/// If those bytes are zero or at or above the curve order (roughly a
/// 2^-128 event), one HMAC-SHA512 tweak of the full seed is tried; a
/// second miss is fatal rather than silently retried.
pub fn derive_keypair(seed: &Seed) -> WalletResult<KeyPair> {
    let secp = Secp256k1::new();

    if let Ok(secret) = SecretKey::from_slice(&seed.as_bytes()[..32]) {
        return Ok(KeyPair::from_secret(&secp, secret));
    }

    let mut mac = HmacSha512::new_from_slice(KEY_TWEAK_DOMAIN)
        .map_err(|_| WalletError::KeyDerivationDegenerate)?;
    mac.update(seed.as_bytes());
    let digest = mac.finalize().into_bytes();
    let mut tweaked = Zeroizing::new([0u8; 64]);
    tweaked.copy_from_slice(&digest);

    SecretKey::from_slice(&tweaked[..32])
        .map(|secret| KeyPair::from_secret(&secp, secret))
        .map_err(|_| WalletError::KeyDerivationDegenerate)
}

/// Sign a payload: ECDSA over keccak256(payload), compact encoding.
pub fn sign(keypair: &KeyPair, payload: &[u8]) -> Signature {
    let secp = Secp256k1::new();
    let msg = Message::from_digest(keccak256(payload));
    secp.sign_ecdsa(&msg, keypair.secret_key())
}

/// Check a compact signature produced by [`sign`].
pub fn verify(public_key: &PublicKey, payload: &[u8], signature: &Signature) -> bool {
    let secp = Secp256k1::new();
    let msg = Message::from_digest(keccak256(payload));
    secp.verify_ecdsa(&msg, signature, public_key).is_ok()
}
