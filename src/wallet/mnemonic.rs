//! Mnemonic Codec
//!
//! Converts between 128-bit entropy and the 12-word English phrase, and
//! owns the normalization applied to user-typed input before any
//! dictionary lookup: trim, collapse internal whitespace to single
//! spaces, case-fold, Unicode NFKD.
//!
//! Decoding is strict. Exactly 12 words, every word in the dictionary,
//! checksum intact. Errors carry word positions, never the words
//! themselves.

use bip39::{Language, Mnemonic};
use zeroize::{Zeroize, Zeroizing};

use crate::error::{MnemonicError, WalletError, WalletResult};
use crate::types::{Entropy, MnemonicPhrase, ENTROPY_LEN, WORD_COUNT};

/// Encode entropy as its 12-word phrase.
///
/// Deterministic: the same entropy always yields the same phrase. The
/// final word carries the 4-bit checksum.
pub fn encode(entropy: &Entropy) -> WalletResult<MnemonicPhrase> {
    let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy.as_bytes())
        .map_err(|e| WalletError::EntropySource(e.to_string()))?;
    Ok(MnemonicPhrase::new_unchecked(mnemonic.to_string()))
}

/// Decode a phrase back to its entropy.
///
/// Inverse of [`encode`] for any phrase that validates.
pub fn decode(words: &str) -> Result<Entropy, MnemonicError> {
    let mnemonic = parse(words)?;
    let (mut raw, len) = mnemonic.to_entropy_array();
    debug_assert_eq!(len, ENTROPY_LEN);
    let mut bytes = [0u8; ENTROPY_LEN];
    bytes.copy_from_slice(&raw[..ENTROPY_LEN]);
    raw.zeroize();
    Ok(Entropy::from_bytes(bytes))
}

/// Validate user-typed words and return the canonical phrase.
///
/// The returned phrase is byte-identical to dictionary entries joined by
/// single spaces, whatever casing or spacing the user typed.
pub fn parse_phrase(words: &str) -> Result<MnemonicPhrase, MnemonicError> {
    let mnemonic = parse(words)?;
    Ok(MnemonicPhrase::new_unchecked(mnemonic.to_string()))
}

fn parse(words: &str) -> Result<Mnemonic, MnemonicError> {
    let normalized = normalize(words);
    let count = normalized.split(' ').filter(|w| !w.is_empty()).count();
    // bip39 also accepts 15/18/21/24 words; this wallet format does not.
    if count != WORD_COUNT {
        return Err(MnemonicError::WrongLength(count));
    }
    // normalize() already produced NFKD lowercase, which is what the
    // *_normalized entry points expect.
    Mnemonic::parse_in_normalized(Language::English, normalized.as_str())
        .map_err(map_bip39_error)
}

/// Canonicalize raw input: NFKD, lowercase, single-space separated.
pub(crate) fn normalize(input: &str) -> Zeroizing<String> {
    use unicode_normalization::UnicodeNormalization;

    let folded = Zeroizing::new(
        input
            .nfkd()
            .flat_map(char::to_lowercase)
            .collect::<String>(),
    );
    Zeroizing::new(folded.split_whitespace().collect::<Vec<&str>>().join(" "))
}

fn map_bip39_error(err: bip39::Error) -> MnemonicError {
    match err {
        bip39::Error::BadWordCount(count) => MnemonicError::WrongLength(count),
        bip39::Error::UnknownWord(index) => MnemonicError::UnknownWord(index),
        bip39::Error::InvalidChecksum => MnemonicError::ChecksumMismatch,
        // English-only crate config; word count was checked above.
        _ => MnemonicError::ChecksumMismatch,
    }
}
