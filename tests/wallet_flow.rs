//! End-to-end flows across the session and store layers, pinned to the
//! published BIP39 reference vectors where they apply.

use std::sync::{Arc, Once};

use secrecy::SecretString;
use tempfile::TempDir;
use wallet_core::{
    encode, EncryptedFileStore, Entropy, KdfParams, KeychainStore, MemoryStore, SecretStore,
    StoreError, WalletError, WalletSession,
};

/// (entropy, canonical phrase, address with empty passphrase)
const VECTORS: &[(&str, &str, &str)] = &[
    (
        "00000000000000000000000000000000",
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
        "0xea6e8f7525e8af0669546ac6c5b8318fd2c6d7b6",
    ),
    (
        "7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f",
        "legal winner thank year wave sausage worth useful legal winner thank yellow",
        "0x5f8ad1b918ac16b21811f034f956e2cc605eefe6",
    ),
    (
        "80808080808080808080808080808080",
        "letter advice cage absurd amount doctor acoustic avoid letter advice cage above",
        "0x0395dca432634f5a3d33782416d5748646fe593e",
    ),
    (
        "ffffffffffffffffffffffffffffffff",
        "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo wrong",
        "0xd454163e56b2d3e50971019ea25a5dcf3c32f975",
    ),
];

#[tokio::test]
async fn published_vectors_flow_through_import() {
    for &(entropy_hex, phrase, address) in VECTORS {
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(entropy_hex, &mut bytes).expect("entropy hex");
        let encoded = encode(&Entropy::from_bytes(bytes)).expect("encode");
        assert_eq!(encoded.as_str(), phrase, "phrase for {entropy_hex}");

        let session = WalletSession::new(Arc::new(MemoryStore::new()));
        let summary = session.import(phrase, None).await.expect("import");
        assert_eq!(summary.address.as_str(), address, "address for {entropy_hex}");
        assert_eq!(summary.checksum_address.to_lowercase(), address);
        assert!(summary.has_mnemonic);
    }
}

#[tokio::test]
async fn passphrase_import_matches_the_published_vector() {
    // All-zero entropy under the reference passphrase TREZOR.
    let session = WalletSession::new(Arc::new(MemoryStore::new()));
    let summary = session
        .import(VECTORS[0].1, Some(SecretString::from("TREZOR")))
        .await
        .expect("import with passphrase");
    assert_eq!(
        summary.address.as_str(),
        "0xacaec9b3680ab9bfb5738967581f1d33890866cb"
    );
    // The passphrase must move the address away from the plain vector.
    assert_ne!(summary.address.as_str(), VECTORS[0].2);
}

#[tokio::test]
async fn generate_export_clear_import_recovers_the_wallet() {
    let session = WalletSession::new(Arc::new(MemoryStore::new()));
    let original = session.generate().await.expect("generate");
    let signature = session.sign(b"proof of possession").expect("sign");

    let phrase = session.export().expect("export");
    assert!(session.verify_phrase(&phrase).expect("verify own phrase"));

    session.clear().expect("clear");
    assert!(matches!(session.sign(b"x"), Err(WalletError::SessionEmpty)));

    let recovered = session.import(&phrase, None).await.expect("re-import");
    assert_eq!(recovered.address, original.address);
    assert_eq!(
        session.sign(b"proof of possession").expect("sign again"),
        signature,
        "the recovered key signs identically",
    );
}

#[tokio::test]
async fn encrypted_file_store_restores_across_sessions() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("wallet.enc.json");

    let first = WalletSession::new(Arc::new(EncryptedFileStore::with_kdf_params(
        &path,
        SecretString::from("correct horse battery"),
        KdfParams::fast(),
    )));
    let summary = first.generate().await.expect("generate");
    let phrase = first.export().expect("export");
    first.persist().await.expect("persist");
    drop(first);

    let second = WalletSession::new(Arc::new(EncryptedFileStore::with_kdf_params(
        &path,
        SecretString::from("correct horse battery"),
        KdfParams::fast(),
    )));
    assert!(second.restore().await.expect("restore"));
    assert_eq!(second.address().expect("address"), summary.address);
    assert_eq!(
        second.export().expect("phrase survives the file store").as_str(),
        phrase.as_str()
    );

    let wrong = WalletSession::new(Arc::new(EncryptedFileStore::with_kdf_params(
        &path,
        SecretString::from("incorrect zebra battery"),
        KdfParams::fast(),
    )));
    let err = wrong.restore().await.expect_err("wrong password");
    assert!(matches!(err, WalletError::Storage(StoreError::Corrupt(_))));
    // The failed attempt must leave the blob on disk.
    assert!(path.exists());
}

static MOCK: Once = Once::new();

fn use_mock_keychain() {
    MOCK.call_once(|| {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
    });
}

#[tokio::test]
async fn keychain_backend_restores_key_only() {
    use_mock_keychain();

    let store = Arc::new(
        KeychainStore::with_names("wallet-core-flow", "key-only").expect("keychain entry"),
    );
    let first = WalletSession::new(Arc::clone(&store) as Arc<dyn SecretStore>);
    let summary = first.generate().await.expect("generate");
    first.persist().await.expect("persist");
    drop(first);

    let second = WalletSession::new(Arc::clone(&store) as Arc<dyn SecretStore>);
    assert!(second.restore().await.expect("restore"));
    assert_eq!(second.address().expect("address"), summary.address);

    // The keychain keeps only the key, so the phrase is gone for good.
    assert!(matches!(
        second.export(),
        Err(WalletError::MnemonicUnavailable)
    ));
    assert!(!second.summary().expect("summary").has_mnemonic);

    second.purge().await.expect("purge");
    assert!(!second.restore().await.expect("restore after purge"));
}

#[tokio::test]
async fn stored_key_restores_passphrase_wallets_verbatim() {
    let store = Arc::new(MemoryStore::new());
    let first = WalletSession::new(Arc::clone(&store) as Arc<dyn SecretStore>);
    let summary = first
        .generate_with_passphrase(Some(SecretString::from("hunter22")))
        .await
        .expect("generate");
    first.persist().await.expect("persist");

    // The stored key is authoritative; no passphrase is needed to restore.
    let second = WalletSession::new(store);
    assert!(second.restore().await.expect("restore"));
    assert_eq!(second.address().expect("address"), summary.address);

    // Re-deriving from the phrase without the passphrase lands elsewhere.
    let phrase = second.export().expect("export");
    let rederived = second.import(&phrase, None).await.expect("import");
    assert_ne!(rederived.address, summary.address);
}
