// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use taskbus_core::{Intent, ReceiptStatus};
use taskbus_storage::{list_inbox, write_receipt};
use tempfile::tempdir;

fn session(tmp: &std::path::Path, roles: &[&str]) -> SessionPaths {
    let paths = SessionPaths::new(tmp);
    for role in roles {
        std::fs::create_dir_all(tmp.join("roles").join(role)).unwrap();
    }
    paths
}

fn receipt(role: &str, request_from: &str, request_to: &str, status: ReceiptStatus, body: &str) -> Receipt {
    Receipt {
        id: MessageId::from_string("m-1"),
        role: Role::new(role),
        thread: "main".to_string(),
        request_from: Role::new(request_from),
        request_to: Role::new(request_to),
        request_intent: Intent::Implement,
        task_id: None,
        status,
        codex_rc: 0,
        finished_at: "2026-07-28T00:00:00Z".to_string(),
        body: body.to_string(),
    }
}

#[test]
fn forwards_a_done_receipt_to_lead_and_requester() {
    let tmp = tempdir().unwrap();
    let paths = session(tmp.path(), &["lead", "builder-a", "reviewer"]);
    let r = receipt("builder-a", "reviewer", "builder-a", ReceiptStatus::Done, "all good");
    write_receipt(&paths, &r).unwrap();

    let outcomes = scan_outbox(&paths).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(matches!(
        outcomes[0],
        ReceiptOutcome::Forwarded { receipt_copies: 2, directive_messages: 0, rejections: 0 }
    ));

    assert_eq!(list_inbox(&paths, &Role::lead()).unwrap().len(), 1);
    assert_eq!(list_inbox(&paths, &Role::new("reviewer")).unwrap().len(), 1);
    assert_eq!(list_inbox(&paths, &Role::new("builder-a")).unwrap().len(), 0);
}

#[test]
fn a_second_scan_does_not_reforward_the_same_receipt() {
    let tmp = tempdir().unwrap();
    let paths = session(tmp.path(), &["lead", "builder-a"]);
    let r = receipt("builder-a", "lead", "builder-a", ReceiptStatus::Done, "done");
    write_receipt(&paths, &r).unwrap();

    scan_outbox(&paths).unwrap();
    let before = list_inbox(&paths, &Role::lead()).unwrap().len();

    let second = scan_outbox(&paths).unwrap();
    assert_eq!(second, vec![ReceiptOutcome::AlreadyProcessed]);
    assert_eq!(list_inbox(&paths, &Role::lead()).unwrap().len(), before);
}

#[test]
fn router_originated_receipts_are_never_reforwarded() {
    let tmp = tempdir().unwrap();
    let paths = session(tmp.path(), &["lead", "builder-a"]);
    let r = receipt("builder-a", "router", "builder-a", ReceiptStatus::Done, "forwarded alert handled");
    write_receipt(&paths, &r).unwrap();

    let outcomes = scan_outbox(&paths).unwrap();
    assert_eq!(outcomes, vec![ReceiptOutcome::LoopPrevented]);
    assert_eq!(list_inbox(&paths, &Role::lead()).unwrap().len(), 0);

    let again = scan_outbox(&paths).unwrap();
    assert_eq!(again, vec![ReceiptOutcome::AlreadyProcessed]);
}

#[test]
fn quarantines_a_malformed_receipt_instead_of_panicking() {
    let tmp = tempdir().unwrap();
    let paths = session(tmp.path(), &["lead"]);
    let bad_path = paths.outbox_receipt("m-2", &Role::new("builder-a"));
    std::fs::create_dir_all(bad_path.parent().unwrap()).unwrap();
    std::fs::write(&bad_path, "not a valid envelope at all").unwrap();

    let outcomes = scan_outbox(&paths).unwrap();
    assert!(matches!(outcomes[0], ReceiptOutcome::Quarantined { .. }));
    assert!(!bad_path.exists());
    assert_eq!(std::fs::read_dir(paths.router_bad_receipts_dir()).unwrap().count(), 2); // file + .error.txt
}

#[test]
fn forwards_directive_messages_and_rejects_disallowed_ones() {
    let tmp = tempdir().unwrap();
    let paths = session(tmp.path(), &["lead", "builder-a", "reviewer"]);
    let body = r#"work done
::bus-send{to="reviewer" intent="review" risk="low" message="please check"}
::bus-send{to="builder-a" intent="implement" message="do more work"}
"#;
    let r = receipt("builder-a", "lead", "builder-a", ReceiptStatus::Done, body);
    write_receipt(&paths, &r).unwrap();

    let outcomes = scan_outbox(&paths).unwrap();
    match &outcomes[0] {
        ReceiptOutcome::Forwarded { directive_messages, rejections, .. } => {
            assert_eq!(*directive_messages, 1, "only the review directive is capability-allowed");
            assert_eq!(*rejections, 1, "builder-a may not emit implement");
        }
        other => panic!("expected Forwarded, got {other:?}"),
    }

    assert_eq!(list_inbox(&paths, &Role::new("reviewer")).unwrap().len(), 1);
    // lead gets the forwarded receipt copy plus the rejection alert
    assert_eq!(list_inbox(&paths, &Role::lead()).unwrap().len(), 2);
}

#[test]
fn retry_receipts_forward_as_alerts_to_lead() {
    let tmp = tempdir().unwrap();
    let paths = session(tmp.path(), &["lead", "builder-a"]);
    let r = receipt("builder-a", "lead", "builder-a", ReceiptStatus::Retry, "failed once");
    write_receipt(&paths, &r).unwrap();

    scan_outbox(&paths).unwrap();
    let inbox = list_inbox(&paths, &Role::lead()).unwrap();
    assert_eq!(inbox.len(), 1);
    let forwarded = taskbus_storage::read_message(&inbox[0]).unwrap();
    assert_eq!(forwarded.intent, Intent::Alert);
}
