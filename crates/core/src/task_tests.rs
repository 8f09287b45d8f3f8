// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sample_task() -> Task {
    Task {
        id: TaskId::from_string("T1"),
        title: "Add greeting".to_string(),
        status: TaskStatus::Pending,
        owner: Role::new("builder-a"),
        claimed_by: None,
        claimed_at: None,
        claim_message_id: None,
        work_type: "implement".to_string(),
        risk: Risk::Low,
        intent: Intent::Implement,
        acceptance: vec!["prints hello".to_string()],
        depends_on: vec![],
        source_message_id: Some(MessageId::from_string("m-1")),
        created_by: "lead".to_string(),
        created_at: "2026-07-28T00:00:00+00:00".to_string(),
        updated_at: "2026-07-28T00:00:00+00:00".to_string(),
        dispatch: None,
        history: vec![],
        evidence: vec![],
        completed_by: None,
        completed_at: None,
        receipt_file: None,
        last_error: None,
        last_error_by: None,
        last_error_at: None,
    }
}

#[test]
fn deps_satisfied_true_when_no_dependencies() {
    let task = sample_task();
    assert!(task.deps_satisfied(|_| false));
}

#[test]
fn deps_satisfied_checks_every_dependency() {
    let mut task = sample_task();
    task.depends_on = vec![TaskId::from_string("T0"), TaskId::from_string("T-1")];
    assert!(!task.deps_satisfied(|id| id.as_str() == "T0"));
    assert!(task.deps_satisfied(|_| true));
}

#[test]
fn serde_round_trips_through_json() {
    let task = sample_task();
    let json = serde_json::to_string(&task).expect("serialize");
    let parsed: Task = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(parsed, task);
}

#[test]
fn push_history_appends_entry() {
    let mut task = sample_task();
    task.push_history(Action::Claimed, "builder-a", None, "2026-07-28T01:00:00+00:00");
    assert_eq!(task.history.len(), 1);
    assert_eq!(task.history[0].action, Action::Claimed);
}

#[test]
fn format_brief_includes_id_status_owner_title() {
    let task = sample_task();
    let brief = task.format_brief();
    assert!(brief.contains("T1"));
    assert!(brief.contains("pending"));
    assert!(brief.contains("builder-a"));
    assert!(brief.contains("Add greeting"));
}
