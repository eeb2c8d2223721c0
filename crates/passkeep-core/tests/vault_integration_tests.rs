//! End-to-end flows through the public vault API.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockEncryptMut, KeyIvInit};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::ExposeSecret;

use passkeep_core::crypto::{SALT_LEN, derive_key};
use passkeep_core::vault::{
    Credential, KeyStatus, LoadOutcome, MasterKeyError, MasterKeyManager, VaultPaths,
};

const PASSWORD: &str = "Integration-Pw-1!";

fn manager_in(dir: &std::path::Path) -> MasterKeyManager {
    MasterKeyManager::new(VaultPaths::new(dir))
}

#[test]
fn full_lifecycle_setup_save_unlock_load() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager_in(dir.path());
    assert_eq!(manager.status(), KeyStatus::AwaitingSetup);

    let mut session = manager.setup(PASSWORD).unwrap();
    session
        .store_mut()
        .add(Credential::new("mail", "alice", "hunter2").with_url("https://mail.example.org"))
        .unwrap();
    session
        .store_mut()
        .add(Credential::new("ci", "alice", "secret").with_group("work"))
        .unwrap();
    session.save().unwrap();
    drop(session);

    // A second process: verify, unlock, read back.
    let manager = manager_in(dir.path());
    assert_eq!(manager.status(), KeyStatus::AwaitingVerification);
    let mut session = manager.unlock(PASSWORD).unwrap();
    assert!(matches!(session.load().unwrap(), LoadOutcome::Loaded(2)));

    let entries = session.store().entries();
    assert_eq!(entries[0].title, "mail");
    assert_eq!(entries[0].url.as_deref(), Some("https://mail.example.org"));
    assert_eq!(entries[1].group, "work");
}

#[test]
fn wrong_password_never_unlocks() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager_in(dir.path());
    manager.setup(PASSWORD).unwrap();

    for attempt in ["Wrong-Pw-2@", "integration-pw-1!", ""] {
        assert!(matches!(
            manager.unlock(attempt),
            Err(MasterKeyError::IncorrectPassword)
        ));
    }
}

#[test]
fn legacy_vault_file_loads_through_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager_in(dir.path());
    let session = manager.setup(PASSWORD).unwrap();

    // Write a vault file in the pre-versioning layout: base64([iv][ct]),
    // encrypted under the same derived key a legacy writer would have used.
    let salt: [u8; SALT_LEN] = std::fs::read(dir.path().join("salt.bin"))
        .unwrap()
        .try_into()
        .unwrap();
    let key = derive_key(PASSWORD, &salt);
    let entries = vec![Credential::new("legacy", "old-user", "old-pw")];
    let plaintext = serde_json::to_vec(&entries).unwrap();

    type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
    let iv = [5u8; 16];
    let ciphertext = Aes256CbcEnc::new(key.expose_secret().into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(&plaintext);
    let mut raw = iv.to_vec();
    raw.extend_from_slice(&ciphertext);
    std::fs::write(dir.path().join("passwords.json"), BASE64.encode(raw)).unwrap();
    drop(session);

    let mut session = manager.unlock(PASSWORD).unwrap();
    assert!(matches!(session.load().unwrap(), LoadOutcome::Loaded(1)));
    assert_eq!(session.store().entries()[0].title, "legacy");

    // Saving upgrades the file to the versioned envelope.
    session.save().unwrap();
    let text = std::fs::read_to_string(dir.path().join("passwords.json")).unwrap();
    assert!(text.contains("\"version\":\"1.0\""));
}

#[test]
fn stale_temp_file_does_not_disturb_the_vault() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager_in(dir.path());
    let mut session = manager.setup(PASSWORD).unwrap();
    session
        .store_mut()
        .add(Credential::new("mail", "alice", "pw"))
        .unwrap();
    session.save().unwrap();

    // Debris from a crashed save attempt.
    std::fs::write(dir.path().join(".tmpXYZ123"), b"partial garbage").unwrap();

    assert!(matches!(session.load().unwrap(), LoadOutcome::Loaded(1)));
}

#[test]
fn group_filtering_is_exact_and_ordered() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager_in(dir.path());
    let mut session = manager.setup(PASSWORD).unwrap();

    session
        .store_mut()
        .add(Credential::new("home-router", "admin", "pw"))
        .unwrap();
    session
        .store_mut()
        .add(Credential::new("jira", "alice", "pw").with_group("work"))
        .unwrap();
    session
        .store_mut()
        .add(Credential::new("github", "alice", "pw").with_group("work"))
        .unwrap();

    let store = session.store();
    let work: Vec<&str> = store.list_by_group("work").map(|c| c.title.as_str()).collect();
    assert_eq!(work, vec!["jira", "github"]);

    let default: Vec<&str> = store
        .list_by_group("default")
        .map(|c| c.title.as_str())
        .collect();
    assert_eq!(default, vec!["home-router"]);
}

#[test]
fn edit_and_remove_through_group_display_indices() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager_in(dir.path());
    let mut session = manager.setup(PASSWORD).unwrap();

    session
        .store_mut()
        .add(Credential::new("personal-mail", "me", "pw"))
        .unwrap();
    session
        .store_mut()
        .add(Credential::new("jira", "alice", "pw").with_group("work"))
        .unwrap();
    session
        .store_mut()
        .add(Credential::new("github", "alice", "pw").with_group("work"))
        .unwrap();

    // The UI shows "github" at display index 1 of the "work" filter.
    let absolute = session
        .store()
        .resolve_group_index("work", 1)
        .expect("display index must resolve");
    session
        .store_mut()
        .update(
            absolute,
            Credential::new("github", "alice", "rotated-pw").with_group("work"),
        )
        .unwrap();
    assert_eq!(session.store().entries()[2].password, "rotated-pw");

    let absolute = session.store().resolve_group_index("work", 0).unwrap();
    let removed = session.store_mut().remove(absolute).unwrap();
    assert_eq!(removed.title, "jira");
    assert_eq!(session.store().len(), 2);
}
