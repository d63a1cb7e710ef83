//! Address Deriver
//!
//! One-way transform from a secp256k1 public key to the account address,
//! plus the mixed-case checksum display form.

use secp256k1::PublicKey;
use tiny_keccak::{Hasher, Keccak};

use crate::types::Address;

/// keccak256 (the pre-standard Ethereum variant, not NIST SHA-3).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Derive the canonical address for a public key.
///
/// keccak256 of the uncompressed point without its 0x04 prefix byte,
/// last 20 bytes, rendered as lowercase hex with a `0x` prefix. The
/// lowercase form is the identity used for storage and comparison.
pub fn derive_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let digest = keccak256(&uncompressed[1..]);
    Address::from_canonical(format!("0x{}", hex::encode(&digest[12..])))
}

/// Mixed-case checksum rendering of a canonical address.
///
/// Each alphabetic hex digit is uppercased when the corresponding nibble
/// of keccak256(lowercase_hex) is 8 or more. Display-only; equality
/// stays on the lowercase form.
pub fn checksum_address(address: &Address) -> String {
    let lower = address.as_str().trim_start_matches("0x");
    let hash = keccak256(lower.as_bytes());

    let mut result = String::with_capacity(42);
    result.push_str("0x");
    for (i, ch) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if ch.is_ascii_digit() || nibble < 8 {
            result.push(ch);
        } else {
            result.push(ch.to_ascii_uppercase());
        }
    }
    result
}

/// Shape check only: `0x` followed by exactly 40 hex digits.
///
/// Accepts any casing; says nothing about checksum validity.
pub fn is_valid_address_format(address: &str) -> bool {
    let Some(body) = address.strip_prefix("0x") else {
        return false;
    };
    body.len() == 40 && body.chars().all(|c| c.is_ascii_hexdigit())
}
