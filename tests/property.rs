use proptest::prelude::*;
use secp256k1::{Secp256k1, SecretKey};
use wallet_core::{
    checksum_address, decode, derive_address, encode, is_valid_phrase, is_valid_word, keccak256,
    parse_phrase, sign, validate_phrase, verify, Entropy, KeyPair, MnemonicError,
};

fn any_secret_key() -> impl Strategy<Value = SecretKey> {
    prop::array::uniform32(any::<u8>()).prop_filter_map("valid secp256k1 scalar", |bytes| {
        SecretKey::from_slice(&bytes).ok()
    })
}

proptest! {
    #[test]
    fn mnemonics_roundtrip_through_the_codec(bytes in prop::array::uniform16(any::<u8>())) {
        let phrase = encode(&Entropy::from_bytes(bytes)).expect("encode");
        prop_assert_eq!(phrase.word_count(), 12);
        prop_assert!(phrase.words().all(is_valid_word));
        prop_assert!(is_valid_phrase(phrase.as_str()));

        let recovered = decode(phrase.as_str()).expect("decode");
        prop_assert_eq!(recovered.as_bytes(), &bytes);
    }

    #[test]
    fn checksum_binds_the_final_word(bytes in prop::array::uniform16(any::<u8>())) {
        let phrase = encode(&Entropy::from_bytes(bytes)).expect("encode");
        let canonical = phrase.as_str().to_owned();
        let (head, last) = canonical.rsplit_once(' ').expect("twelve words");

        // The low bit of the final 11-bit group is a checksum bit, so
        // swapping the last word for its index-neighbor always breaks it.
        let list = bip39::Language::English.word_list();
        let index = list.binary_search(&last).expect("dictionary word");
        let mutated = format!("{head} {}", list[index ^ 1]);

        prop_assert_eq!(
            validate_phrase(&mutated).unwrap_err(),
            MnemonicError::ChecksumMismatch
        );
    }

    #[test]
    fn normalization_recovers_the_canonical_phrase(
        bytes in prop::array::uniform16(any::<u8>()),
        pad in 1usize..4,
    ) {
        let phrase = encode(&Entropy::from_bytes(bytes)).expect("encode");
        let gap = " ".repeat(pad);
        let messy = format!(
            "{gap}{}{gap}",
            phrase.as_str().to_uppercase().replace(' ', &gap)
        );

        let parsed = parse_phrase(&messy).expect("messy input normalizes");
        prop_assert_eq!(parsed.as_str(), phrase.as_str());
    }

    #[test]
    fn checksum_addresses_roundtrip(secret in any_secret_key()) {
        let address = derive_address(&secret.public_key(&Secp256k1::new()));
        let checksummed = checksum_address(&address);

        prop_assert!(checksummed.starts_with("0x"));
        prop_assert_eq!(checksummed.to_lowercase(), address.as_str());

        let lower = address.as_str().trim_start_matches("0x");
        let hash = keccak256(lower.as_bytes());
        let mut expected = String::from("0x");
        for (i, ch) in lower.chars().enumerate() {
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if ch.is_ascii_digit() || nibble < 8 {
                expected.push(ch);
            } else {
                expected.push(ch.to_ascii_uppercase());
            }
        }
        prop_assert_eq!(checksummed, expected);
    }

    #[test]
    fn signatures_verify_and_bind_the_payload(
        secret in any_secret_key(),
        payload in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let keypair = KeyPair::from_secret(&Secp256k1::new(), secret);
        let signature = sign(&keypair, &payload);
        prop_assert!(verify(keypair.public_key(), &payload, &signature));

        let mut tampered = payload.clone();
        tampered.push(0x01);
        prop_assert!(!verify(keypair.public_key(), &tampered, &signature));
    }
}
