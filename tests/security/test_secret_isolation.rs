//! Security Tests: Secret Isolation
//!
//! Secrets typed at the password or passcode prompt must never reach the
//! transcript, the command history, logs of engine state, or configuration
//! files.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::sync::Arc;

use omegaterm::config::loader::ConfigLoader;
use omegaterm::config::{Config, LoginMode};
use omegaterm::credentials::{Credentials, SecretDigest};
use omegaterm::persistence::{FileSessionStore, MemorySessionStore, SessionStore};
use omegaterm::SessionEngine;
use tempfile::TempDir;
use test_utils::*;

#[test]
fn test_password_never_reaches_transcript() {
    let mut engine = booted_engine(create_test_config(), MemorySessionStore::new());

    engine.submit(TEST_USERNAME).unwrap();
    engine.submit("hunter2-wrong").unwrap();
    engine.submit(TEST_USERNAME).unwrap();
    engine.submit(TEST_PASSWORD).unwrap();

    let masks = engine.transcript().lines().filter(|l| *l == "> ********").count();
    assert_eq!(masks, 2);
    assert!(engine
        .transcript()
        .lines()
        .all(|l| !l.contains(TEST_PASSWORD) && !l.contains("hunter2")));
}

#[test]
fn test_mask_does_not_leak_length() {
    let mut engine = booted_engine(create_test_config(), MemorySessionStore::new());
    engine.submit(TEST_USERNAME).unwrap();
    engine.submit("x").unwrap();
    engine.submit(TEST_USERNAME).unwrap();
    engine.submit(&"y".repeat(64)).unwrap();

    let masks: Vec<&str> = engine.transcript().lines().filter(|l| l.starts_with("> *")).collect();
    assert_eq!(masks, vec!["> ********", "> ********"]);
}

#[test]
fn test_passcode_never_reaches_transcript() {
    let mut config = create_test_config();
    config.session.login_mode = LoginMode::Passcode;
    let mut engine = booted_engine(config, MemorySessionStore::new());

    engine.submit("not-the-code").unwrap();
    engine.submit(TEST_PASSWORD).unwrap();
    assert!(engine
        .transcript()
        .lines()
        .all(|l| !l.contains(TEST_PASSWORD) && !l.contains("not-the-code")));
}

#[test]
fn test_login_input_is_not_history() {
    let mut engine = logged_in_engine(MemorySessionStore::new());
    assert!(engine.history().is_empty());

    engine.submit("history").unwrap();
    assert_eq!(engine.history().entries(), ["history"]);
}

#[test]
fn test_engine_debug_has_no_secrets() {
    let engine = logged_in_engine(MemorySessionStore::new());
    let debug = format!("{:?}", engine);
    assert!(!debug.contains(TEST_PASSWORD));
    assert!(!debug.contains(&Config::default().credentials.password_digest));
}

#[test]
fn test_credentials_debug_redacts_digests() {
    let credentials = Credentials::from_config(&Config::default().credentials).unwrap();
    let debug = format!("{:?}", credentials);
    assert!(debug.contains("redacted"));
    assert!(!debug.contains("7b1d42fc"));
}

#[test]
fn test_saved_config_holds_only_digests() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");

    let mut config = Config::default();
    config.credentials.password_digest = SecretDigest::generate("correct horse").encode();
    ConfigLoader::new().save_to_path(&config, &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(!content.contains("correct horse"));
    assert!(!content.contains(TEST_PASSWORD));
    assert!(content.contains("sha256$"));
}

#[test]
fn test_custom_digest_replaces_default_secret() {
    let mut config = create_test_config();
    config.credentials.password_digest = SecretDigest::generate("rotated").encode();
    let mut engine = booted_engine(config, MemorySessionStore::new());

    engine.submit(TEST_USERNAME).unwrap();
    engine.submit(TEST_PASSWORD).unwrap();
    assert!(!engine.session().is_authenticated());

    engine.submit(TEST_USERNAME).unwrap();
    engine.submit("rotated").unwrap();
    assert!(engine.session().is_authenticated());
}

#[test]
fn test_session_marker_secure_permissions() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let marker_path = temp_dir.path().join("state").join("session");
    let store = FileSessionStore::new(marker_path.clone());

    let mut engine = SessionEngine::new(create_test_config(), Arc::new(store.clone())).unwrap();
    engine.run_feed_to_idle();
    engine.submit(TEST_USERNAME).unwrap();
    engine.submit(TEST_PASSWORD).unwrap();
    assert!(engine.session().is_authenticated());
    assert!(store.load());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&marker_path)
            .expect("Failed to read metadata")
            .permissions()
            .mode();

        let perms = mode & 0o777;
        assert_eq!(
            perms, 0o600,
            "Session marker should have 0600 permissions, got {:o}",
            perms
        );
    }

    let content = std::fs::read_to_string(&marker_path).unwrap();
    assert!(!content.contains(TEST_PASSWORD));
}
