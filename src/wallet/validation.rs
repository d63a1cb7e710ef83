//! Mnemonic Input Validation
//!
//! Per-keystroke helpers for import screens: dictionary membership for a
//! single word, prefix suggestions for autocomplete, and whole-phrase
//! feedback. All lookups run against the embedded 2048-word English
//! list; nothing here touches key material.

use bip39::Language;

use crate::error::MnemonicError;
use crate::wallet::mnemonic;

/// Check a single word against the dictionary.
///
/// Input goes through the same normalization as full phrases, so
/// `" Abandon "` is valid while `"abandon ability"` is not a word.
pub fn is_valid_word(word: &str) -> bool {
    let normalized = mnemonic::normalize(word);
    if normalized.is_empty() || normalized.contains(' ') {
        return false;
    }
    Language::English
        .word_list()
        .binary_search(&normalized.as_str())
        .is_ok()
}

/// Dictionary words starting with `prefix`, in list order.
///
/// Empty for an empty or multi-word prefix. The list is sorted, so the
/// match region is located by binary partition and returned as a slice
/// of the embedded list.
pub fn suggest_words(prefix: &str) -> &'static [&'static str] {
    let normalized = mnemonic::normalize(prefix);
    if normalized.is_empty() || normalized.contains(' ') {
        return &[];
    }

    let list = Language::English.word_list();
    let start = list.partition_point(|w| *w < normalized.as_str());
    let len = list[start..]
        .iter()
        .take_while(|w| w.starts_with(normalized.as_str()))
        .count();
    &list[start..start + len]
}

/// Full-phrase precheck for form feedback.
///
/// Same checks as a real import, without deriving anything. The error
/// carries a word position when one word is at fault.
pub fn validate_phrase(words: &str) -> Result<(), MnemonicError> {
    mnemonic::parse_phrase(words).map(|_| ())
}

/// Boolean form of [`validate_phrase`].
pub fn is_valid_phrase(words: &str) -> bool {
    validate_phrase(words).is_ok()
}
