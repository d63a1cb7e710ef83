//! Wallet Module
//!
//! The derivation pipeline from entropy to address, plus the interactive
//! input validation used by import flows.

mod address;
mod derivation;
pub mod entropy;
mod mnemonic;
mod validation;

pub use address::*;
pub use derivation::*;
pub use entropy::{EntropySource, OsEntropy};
pub use mnemonic::{decode, encode, parse_phrase};
pub use validation::*;

use secrecy::SecretString;

use crate::error::WalletResult;
use crate::types::{Address, KeyPair, MnemonicPhrase};

/// Run the full pipeline for a validated phrase: stretch the seed and
/// derive the keypair and address.
///
/// This is the slow path (2048 PBKDF2 rounds); callers keep it off
/// interactive threads.
pub fn derive_identity(
    phrase: &MnemonicPhrase,
    passphrase: Option<&SecretString>,
) -> WalletResult<(KeyPair, Address)> {
    let seed = derivation::derive_seed(phrase, passphrase)?;
    let keypair = derivation::derive_keypair(&seed)?;
    let address = address::derive_address(keypair.public_key());
    Ok((keypair, address))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_pipeline_is_deterministic() {
        let phrase = parse_phrase(
            "legal winner thank year wave sausage worth useful legal winner thank yellow",
        )
        .unwrap();
        let (first_keys, first_addr) = derive_identity(&phrase, None).unwrap();
        let (second_keys, second_addr) = derive_identity(&phrase, None).unwrap();

        assert_eq!(first_addr, second_addr);
        assert_eq!(first_keys.public_key(), second_keys.public_key());
        assert_eq!(
            first_addr.as_str(),
            "0x5f8ad1b918ac16b21811f034f956e2cc605eefe6"
        );
    }

    #[test]
    fn passphrase_yields_a_different_identity() {
        let phrase = parse_phrase(
            "legal winner thank year wave sausage worth useful legal winner thank yellow",
        )
        .unwrap();
        let (_, plain) = derive_identity(&phrase, None).unwrap();
        let (_, salted) =
            derive_identity(&phrase, Some(&SecretString::from("extra word"))).unwrap();
        assert_ne!(plain, salted);
    }
}
