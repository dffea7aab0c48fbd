//! Integration Tests for Command Dispatch
//!
//! Every command in the table, driven through a logged-in engine.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::time::Duration;

use omegaterm::commands::COMMANDS;
use omegaterm::engine::{EJECT_NOTICE, STATUS_UNAVAILABLE};
use omegaterm::persistence::{MemorySessionStore, SessionStore};
use omegaterm::{AuthState, Effect, Error, SessionEngine};
use test_utils::*;

fn tail(engine: &SessionEngine, n: usize) -> Vec<String> {
    let lines = engine.transcript().to_vec();
    lines[lines.len().saturating_sub(n)..].to_vec()
}

#[test]
fn test_help_lists_all_commands() {
    let mut engine = logged_in_engine(MemorySessionStore::new());
    engine.submit("help").unwrap();

    let lines = tail(&engine, COMMANDS.len() + 3);
    assert_eq!(lines[0], "> help");
    assert_eq!(lines[1], "");
    assert_eq!(lines[2], "Available commands:");
    for (line, spec) in lines[3..].iter().zip(COMMANDS) {
        assert!(line.starts_with(spec.name), "{:?} should describe {}", line, spec.name);
        assert!(line.ends_with(spec.description));
    }
}

#[test]
fn test_commands_are_case_insensitive_and_trimmed() {
    let mut a = logged_in_engine(MemorySessionStore::new());
    let mut b = logged_in_engine(MemorySessionStore::new());
    a.submit("help").unwrap();
    b.submit("  HELP\t").unwrap();

    assert_eq!(tail(&a, 14), tail(&b, 14));
    assert_eq!(b.history().entries(), ["help"]);
}

#[test]
fn test_version_and_credits() {
    let mut engine = logged_in_engine(MemorySessionStore::new());
    engine.submit("version").unwrap();
    assert_eq!(
        tail(&engine, 2),
        ["> version", "Omega V3 CLI UX v1.3 - Released July 11, 2025"]
    );

    engine.submit("credits").unwrap();
    let lines = tail(&engine, 4);
    assert_eq!(lines[0], "> credits");
    assert_eq!(lines[1], "");
    assert!(lines[2].starts_with("Hermida Enterprise Solutions"));
    assert_eq!(lines[3], "Official site: myhtusa.com");
}

#[test]
fn test_whoami_is_static() {
    let mut engine = logged_in_engine(MemorySessionStore::new());
    engine.submit("whoami").unwrap();
    let expected = engine.config().branding.whoami.clone();
    assert_eq!(tail(&engine, 2), ["> whoami".to_string(), expected]);
}

#[test]
fn test_status_without_snapshot_is_single_unavailable_line() {
    let mut engine = logged_in_engine(MemorySessionStore::new());
    let before = engine.transcript().len();
    engine.submit("status").unwrap();

    assert_eq!(engine.transcript().len(), before + 2);
    assert_eq!(tail(&engine, 1), [STATUS_UNAVAILABLE]);
}

#[test]
fn test_clear_yields_empty_transcript() {
    let mut engine = logged_in_engine(MemorySessionStore::new());
    for _ in 0..50 {
        engine.submit("help").unwrap();
    }
    engine.submit("clear").unwrap();
    assert!(engine.transcript().is_empty());

    // Still logged in and still dispatching
    engine.submit("version").unwrap();
    assert_eq!(engine.transcript().len(), 2);
}

#[test]
fn test_history_replays_commands_in_order() {
    let mut engine = logged_in_engine(MemorySessionStore::new());
    for cmd in ["Version", "bogus", "version", "clear"] {
        engine.submit(cmd).unwrap();
    }
    engine.submit("history").unwrap();

    assert_eq!(
        engine.transcript().to_vec(),
        ["> history", "version", "bogus", "version", "clear", "history"]
    );
}

#[test]
fn test_history_excludes_login_input() {
    let mut engine = logged_in_engine(MemorySessionStore::new());
    engine.submit("history").unwrap();
    assert_eq!(engine.history().entries(), ["history"]);
    assert!(!tail(&engine, 2).iter().any(|l| l == TEST_USERNAME || l == TEST_PASSWORD));
}

#[test]
fn test_unknown_command_echo_is_exact() {
    let mut engine = logged_in_engine(MemorySessionStore::new());
    engine.submit("  rm -RF /  ").unwrap();
    assert_eq!(tail(&engine, 2), ["> rm -rf /", "unknown command: rm -rf /"]);
    assert_eq!(engine.state(), AuthState::Authenticated);
}

#[test]
fn test_logout_resets_transcript_to_banner_and_prompt() {
    let mut engine = logged_in_engine(MemorySessionStore::new());
    engine.submit("help").unwrap();
    let effects = engine.submit("logout").unwrap();

    assert_eq!(effects, vec![Effect::StopPolling]);
    let mut expected = engine.config().branding.banner.clone();
    expected.push(String::new());
    expected.push("Enter username:".to_string());
    assert_eq!(engine.transcript().to_vec(), expected);
    assert!(engine.history().is_empty());
    assert!(engine.status_board().snapshot().is_none());
}

#[test]
fn test_eject_and_reboot_behave_the_same() {
    for cmd in ["eject", "reboot", " REBOOT "] {
        let store = MemorySessionStore::new();
        let mut engine = logged_in_engine(store.clone());
        let effects = engine.submit(cmd).unwrap();

        assert_eq!(
            effects,
            vec![Effect::StopPolling, Effect::Reload { after: Duration::from_millis(10) }]
        );
        assert_eq!(engine.transcript().to_vec(), [EJECT_NOTICE]);
        assert_eq!(engine.state(), AuthState::AwaitingUsername);
        assert!(!store.load());
        assert!(engine.is_reloading());
        assert!(matches!(engine.submit("help"), Err(Error::InputSuspended)));
        assert!(engine.tick().is_empty());
    }
}
