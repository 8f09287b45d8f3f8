// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use taskbus_core::{FakeClock, MessageId, Risk};
use taskbus_storage::SessionPaths;
use tempfile::tempdir;

fn session(tmp: &std::path::Path) -> SessionPaths {
    let paths = SessionPaths::new(tmp);
    std::fs::create_dir_all(tmp.join("roles").join("lead")).unwrap();
    std::fs::create_dir_all(tmp.join("roles").join("builder-a")).unwrap();
    std::fs::create_dir_all(tmp.join("roles").join("reviewer")).unwrap();
    std::fs::create_dir_all(tmp.join("roles").join("tester")).unwrap();
    paths
}

fn bootstrap_message(id: &str) -> Message {
    Message {
        id: MessageId::from_string(id),
        from: Role::lead(),
        to: Role::lead(),
        intent: Intent::Bootstrap,
        thread: "main".to_string(),
        risk: Risk::Medium,
        task_id: None,
        acceptance: Vec::new(),
        body: String::new(),
    }
}

#[test]
fn parse_task_md_extracts_objective_and_bullets() {
    let text = "# Task\nBuild the thing\n\n## Acceptance\n- it compiles\n- it works\n";
    let (objective, acceptance) = parse_task_md(text);
    assert_eq!(objective, "Build the thing");
    assert_eq!(acceptance, vec!["it compiles", "it works"]);
}

#[test]
fn parse_task_md_tolerates_fill_placeholder() {
    let text = "# Task\nDo stuff\n\n## Acceptance\n- (fill)\n";
    let (_, acceptance) = parse_task_md(text);
    assert_eq!(acceptance, vec!["(fill)"]);
}

#[test]
fn creates_implement_review_test_tasks_depending_on_implement() {
    let tmp = tempdir().unwrap();
    let paths = session(tmp.path());
    std::fs::create_dir_all(tmp.path().join("shared")).unwrap();
    std::fs::write(paths.shared_task_md(), "# Task\nShip it\n\n## Acceptance\n- works\n").unwrap();

    let cfg = Config::default();
    let clock = FakeClock::new();
    let message = bootstrap_message("m-1");

    let created = maybe_bootstrap(&paths, &cfg, &clock, &message).unwrap();
    assert_eq!(created.len(), 3);
    assert_eq!(created[0].intent, Intent::Implement);
    assert_eq!(created[0].owner.as_str(), "builder-a");
    assert_eq!(created[1].intent, Intent::Review);
    assert_eq!(created[1].depends_on, vec![created[0].id]);
    assert_eq!(created[2].intent, Intent::Test);
    assert_eq!(created[2].depends_on, vec![created[0].id]);
}

#[test]
fn does_not_rebootstrap_the_same_source_message() {
    let tmp = tempdir().unwrap();
    let paths = session(tmp.path());
    std::fs::create_dir_all(tmp.path().join("shared")).unwrap();
    std::fs::write(paths.shared_task_md(), "# Task\nShip it\n\n## Acceptance\n- works\n").unwrap();

    let cfg = Config::default();
    let clock = FakeClock::new();
    let message = bootstrap_message("m-1");

    let first = maybe_bootstrap(&paths, &cfg, &clock, &message).unwrap();
    assert_eq!(first.len(), 3);
    let second = maybe_bootstrap(&paths, &cfg, &clock, &message).unwrap();
    assert!(second.is_empty());
}

#[test]
fn ignores_non_bootstrap_messages() {
    let tmp = tempdir().unwrap();
    let paths = session(tmp.path());
    let cfg = Config::default();
    let clock = FakeClock::new();
    let mut message = bootstrap_message("m-1");
    message.intent = Intent::Implement;

    let created = maybe_bootstrap(&paths, &cfg, &clock, &message).unwrap();
    assert!(created.is_empty());
}
