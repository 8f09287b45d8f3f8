// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios from spec §8, driven entirely through the
//! `taskbus` binary (assert_cmd) and hand-written bus files — no
//! library crate is linked directly, so these exercise the same
//! surface an operator or a shell script would.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;

fn taskbus() -> Command {
    Command::cargo_bin("taskbus").expect("taskbus binary built by the workspace")
}

/// Lay out `roles/<r>/prompt.md` for each role and an empty `shared/` dir.
fn session(tmp: &Path, roles: &[&str]) -> PathBuf {
    for role in roles {
        let dir = tmp.join("roles").join(role);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("prompt.md"), format!("You are {role}.")).unwrap();
    }
    fs::create_dir_all(tmp.join("shared")).unwrap();
    tmp.to_path_buf()
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout)
        .unwrap_or_else(|e| panic!("expected JSON stdout, got {:?}: {e}", String::from_utf8_lossy(&output.stdout)))
}

fn init_tasks(session: &Path) {
    taskbus()
        .args(["tasks", "init", "--session"])
        .arg(session)
        .assert()
        .success();
}

fn add_task(session: &Path, title: &str, owner: &str) -> String {
    let output = taskbus()
        .args(["tasks", "add", "--session"])
        .arg(session)
        .args(["--title", title, "--owner", owner])
        .output()
        .unwrap();
    assert!(output.status.success(), "add failed: {:?}", output);
    stdout_json(&output)["id"].as_str().unwrap().to_string()
}

#[test]
fn unknown_session_path_exits_with_code_two() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("does-not-exist");

    taskbus()
        .args(["tasks", "list", "--session"])
        .arg(&missing)
        .assert()
        .code(2);
}

#[test]
fn tasks_init_add_show_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session(tmp.path(), &["lead", "builder-a"]);
    init_tasks(&session);

    let task_id = add_task(&session, "Add greeting", "builder-a");

    let output = taskbus()
        .args(["tasks", "show", "--session"])
        .arg(&session)
        .arg(&task_id)
        .output()
        .unwrap();
    assert!(output.status.success());
    let task = stdout_json(&output);
    assert_eq!(task["title"], "Add greeting");
    assert_eq!(task["status"], "pending");
    assert_eq!(task["owner"], "builder-a");
}

#[test]
fn show_of_an_unknown_task_exits_with_code_three() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session(tmp.path(), &["lead"]);
    init_tasks(&session);

    taskbus()
        .args(["tasks", "show", "--session"])
        .arg(&session)
        .arg("T-does-not-exist")
        .assert()
        .code(3);
}

/// Property 3 / scenario 2: `set_dispatch` is idempotent under a repeated
/// `message_id`.
#[test]
fn dispatch_is_idempotent_under_the_same_message_id() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session(tmp.path(), &["lead", "builder-a"]);
    init_tasks(&session);
    let task_id = add_task(&session, "Add greeting", "builder-a");

    let first = taskbus()
        .args(["tasks", "dispatch", "--session"])
        .arg(&session)
        .arg(&task_id)
        .args(["--from", "lead", "--to", "builder-a", "--intent", "implement", "--message-id", "m1"])
        .output()
        .unwrap();
    assert!(first.status.success());

    let second = taskbus()
        .args(["tasks", "dispatch", "--session"])
        .arg(&session)
        .arg(&task_id)
        .args(["--from", "lead", "--to", "builder-a", "--intent", "implement", "--message-id", "m1"])
        .output()
        .unwrap();
    assert!(second.status.success(), "repeating the same message_id must not fail: {:?}", second);

    let shown = taskbus().args(["tasks", "show", "--session"]).arg(&session).arg(&task_id).output().unwrap();
    let task = stdout_json(&shown);
    assert_eq!(task["dispatch"]["message_id"], "m1");

    // Evidence that "m1" is still live (unprocessed inbox entry) makes the
    // prior dispatch non-stale, so a rebind attempt under a new
    // message_id must be rejected (exit 7) rather than silently replacing it.
    write_inbox_message(&session, "builder-a", "m1");

    taskbus()
        .args(["tasks", "dispatch", "--session"])
        .arg(&session)
        .arg(&task_id)
        .args(["--from", "lead", "--to", "builder-a", "--intent", "implement", "--message-id", "m2"])
        .assert()
        .code(7);
}

/// Property 4: claim-then-complete from pending yields exactly two new
/// history entries, in order.
#[test]
fn claim_then_complete_yields_two_ordered_history_entries() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session(tmp.path(), &["lead", "builder-a"]);
    init_tasks(&session);
    let task_id = add_task(&session, "Add greeting", "builder-a");

    taskbus()
        .args(["tasks", "claim", "--session"])
        .arg(&session)
        .arg(&task_id)
        .args(["--role", "builder-a"])
        .assert()
        .success();

    taskbus()
        .args(["tasks", "complete", "--session"])
        .arg(&session)
        .arg(&task_id)
        .args(["--role", "builder-a", "--evidence", "it works"])
        .assert()
        .success();

    let shown = taskbus().args(["tasks", "show", "--session"]).arg(&session).arg(&task_id).output().unwrap();
    let task = stdout_json(&shown);
    assert_eq!(task["status"], "completed");
    assert_eq!(task["completed_by"], "builder-a");
    let actions: Vec<&str> = task["history"].as_array().unwrap().iter().map(|e| e["action"].as_str().unwrap()).collect();
    let claimed_at = actions.iter().position(|a| *a == "claimed").expect("claimed entry present");
    let completed_at = actions.iter().position(|a| *a == "completed").expect("completed entry present");
    assert!(claimed_at < completed_at, "claimed must precede completed: {actions:?}");
}

#[test]
fn claim_by_a_second_role_after_the_first_fails_with_claim_failure_code() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session(tmp.path(), &["lead", "builder-a", "builder-b"]);
    init_tasks(&session);
    let task_id = add_task(&session, "Add greeting", "builder-a");

    taskbus()
        .args(["tasks", "claim", "--session"])
        .arg(&session)
        .arg(&task_id)
        .args(["--role", "builder-a"])
        .assert()
        .success();

    taskbus()
        .args(["tasks", "claim", "--session"])
        .arg(&session)
        .arg(&task_id)
        .args(["--role", "builder-b"])
        .assert()
        .code(4);
}

#[test]
fn complete_by_a_non_claiming_role_fails_with_complete_failure_code() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session(tmp.path(), &["lead", "builder-a", "builder-b"]);
    init_tasks(&session);
    let task_id = add_task(&session, "Add greeting", "builder-a");

    taskbus()
        .args(["tasks", "claim", "--session"])
        .arg(&session)
        .arg(&task_id)
        .args(["--role", "builder-a"])
        .assert()
        .success();

    taskbus()
        .args(["tasks", "complete", "--session"])
        .arg(&session)
        .arg(&task_id)
        .args(["--role", "builder-b"])
        .assert()
        .code(5);
}

#[test]
fn fail_on_an_already_completed_task_is_a_fail_update_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session(tmp.path(), &["lead", "builder-a"]);
    init_tasks(&session);
    let task_id = add_task(&session, "Add greeting", "builder-a");

    taskbus().args(["tasks", "claim", "--session"]).arg(&session).arg(&task_id).args(["--role", "builder-a"]).assert().success();
    taskbus().args(["tasks", "complete", "--session"]).arg(&session).arg(&task_id).args(["--role", "builder-a"]).assert().success();

    taskbus()
        .args(["tasks", "fail", "--session"])
        .arg(&session)
        .arg(&task_id)
        .args(["--role", "builder-a", "--error", "too late"])
        .assert()
        .code(6);
}

/// Scenario 5 (router loop prevention): a receipt authored by the router
/// itself must never be re-forwarded, and repeated scans are no-ops.
#[test]
fn router_does_not_forward_its_own_receipts() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session(tmp.path(), &["lead"]);
    let outbox = session.join("bus").join("outbox");
    fs::create_dir_all(&outbox).unwrap();
    let receipt = "---\n\
id: m-router-1\n\
role: lead\n\
thread: main\n\
request_from: router\n\
request_to: lead\n\
request_intent: alert\n\
status: done\n\
codex_rc: 0\n\
finished_at: 2026-01-01T00:00:00Z\n\
---\n\n\
diagnostic\n";
    fs::write(outbox.join("m-router-1.lead.md"), receipt).unwrap();

    taskbus().args(["router", "once", "--session"]).arg(&session).assert().success();

    let inbox_lead = session.join("bus").join("inbox").join("lead");
    let new_messages = fs::read_dir(&inbox_lead).map(|d| d.count()).unwrap_or(0);
    assert_eq!(new_messages, 0, "a router-authored receipt must not produce a new inbox message");

    // Second scan over the same unchanged file is a no-op: outbox entry
    // still present (router never deletes receipts, only marks them
    // processed) and still nothing new in the inbox.
    taskbus().args(["router", "once", "--session"]).arg(&session).assert().success();
    assert_eq!(fs::read_dir(&inbox_lead).map(|d| d.count()).unwrap_or(0), 0);
}

fn write_fake_codegen(dir: &Path) -> PathBuf {
    let script = dir.join("fake-codex.sh");
    fs::write(
        &script,
        "#!/bin/sh\n\
out=\"\"\n\
while [ $# -gt 0 ]; do\n\
  if [ \"$1\" = \"--output-last-message\" ]; then\n\
    out=\"$2\"\n\
  fi\n\
  shift\n\
done\n\
cat >/dev/null\n\
if [ -n \"$out\" ]; then\n\
  echo \"all done\" > \"$out\"\n\
fi\n\
exit 0\n",
    )
    .unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script, perms).unwrap();
    }
    script
}

fn write_failing_codegen(dir: &Path) -> PathBuf {
    let script = dir.join("fake-codex-failing.sh");
    fs::write(&script, "#!/bin/sh\ncat >/dev/null\nexit 1\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script, perms).unwrap();
    }
    script
}

fn write_inbox_message(session: &Path, role: &str, id: &str) {
    let dir = session.join("bus").join("inbox").join(role);
    fs::create_dir_all(&dir).unwrap();
    let text = format!(
        "---\n\
id: {id}\n\
from: lead\n\
to: {role}\n\
intent: implement\n\
thread: main\n\
risk: medium\n\
---\n\n\
please implement\n"
    );
    fs::write(dir.join(format!("{id}.md")), text).unwrap();
}

/// Scenario 6 (crash recovery): a processing lockdir left behind by a
/// dead pid must be reclaimed rather than blocking the worker forever.
#[test]
fn worker_once_reclaims_a_stale_processing_lock() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session(tmp.path(), &["builder-a"]);
    write_inbox_message(&session, "builder-a", "m-crash-1");

    let lockdir = session.join("state").join("processing").join("m-crash-1.builder-a.lockdir");
    fs::create_dir_all(&lockdir).unwrap();
    // A pid astronomically unlikely to be alive in any test environment.
    fs::write(lockdir.join("pid"), "2147483000").unwrap();

    let script = write_fake_codegen(tmp.path());

    taskbus()
        .args(["worker", "once", "--session"])
        .arg(&session)
        .args(["--role", "builder-a"])
        .env("AUTOPILOT_CODEGEN_BIN", &script)
        .assert()
        .success();

    assert!(session.join("state").join("done").join("m-crash-1.builder-a.ok").exists());
    assert!(session.join("state").join("archive").join("builder-a").join("m-crash-1.md").exists());
    assert!(!lockdir.exists(), "the stale lock must have been cleaned up");
}

/// Scenario 3: a tool that always fails is retried three times, then
/// dead-lettered with the fixed `codex_rc=99` sentinel on the fourth run.
#[test]
fn worker_once_retries_three_times_then_deadletters_on_the_fourth_run() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session(tmp.path(), &["builder-a"]);
    write_inbox_message(&session, "builder-a", "m-fail-1");
    let script = write_failing_codegen(tmp.path());
    let receipt_path = session.join("bus").join("outbox").join("m-fail-1.builder-a.md");

    for attempt in 1..=3 {
        let output = taskbus()
            .args(["worker", "once", "--session"])
            .arg(&session)
            .args(["--role", "builder-a"])
            .env("AUTOPILOT_CODEGEN_BIN", &script)
            .output()
            .unwrap();
        assert!(output.status.success(), "attempt {attempt} should succeed with a Retried outcome: {output:?}");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Retried"), "attempt {attempt} stdout was {stdout:?}");

        let receipt = fs::read_to_string(&receipt_path).unwrap();
        assert!(receipt.contains("status: retry"), "attempt {attempt} receipt was {receipt:?}");
        assert!(
            session.join("bus").join("inbox").join("builder-a").join("m-fail-1.md").exists(),
            "message must stay in the inbox while retries remain"
        );
    }

    let output = taskbus()
        .args(["worker", "once", "--session"])
        .arg(&session)
        .args(["--role", "builder-a"])
        .env("AUTOPILOT_CODEGEN_BIN", &script)
        .output()
        .unwrap();
    assert!(output.status.success(), "the fourth attempt should succeed with a Deadlettered outcome: {output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Deadlettered"));

    let receipt = fs::read_to_string(&receipt_path).unwrap();
    assert!(receipt.contains("status: deadletter"), "final receipt was {receipt:?}");
    assert!(receipt.contains("codex_rc: 99"), "final receipt was {receipt:?}");

    assert!(!session.join("bus").join("inbox").join("builder-a").join("m-fail-1.md").exists());
    assert!(session.join("bus").join("deadletter").join("builder-a").join("m-fail-1.md").exists());
}

#[test]
fn worker_once_with_an_empty_inbox_is_nothing_to_do() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session(tmp.path(), &["builder-a"]);

    taskbus()
        .args(["worker", "once", "--session"])
        .arg(&session)
        .args(["--role", "builder-a"])
        .assert()
        .code(3);
}

#[test]
fn worker_once_rejects_an_unknown_role() {
    let tmp = tempfile::tempdir().unwrap();
    let session = session(tmp.path(), &["builder-a"]);

    taskbus()
        .args(["worker", "once", "--session"])
        .arg(&session)
        .args(["--role", "no-such-role"])
        .assert()
        .code(2);
}
