// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Router (spec §4.5 C6): watches the single outbox, dedups by
//! content hash, prevents forwarding loops, applies capability policy to
//! embedded directives, and forwards receipts to interested roles.

use std::path::PathBuf;

use taskbus_core::{sort_roles, Intent, Message, MessageId, Receipt, Risk, Role};
use taskbus_storage::{
    enqueue_message, list_outbox, quarantine_bad_receipt, router_receipt_processed,
    write_router_processed, SessionPaths,
};

use crate::error::RouterError;
use crate::policy::{evaluate_directive, fence_receipt, receipt_forward_intent_risk, receipt_forward_targets, DirectiveDecision};

/// What happened to one outbox entry during a scan, for tests and for
/// the caller's own logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptOutcome {
    AlreadyProcessed,
    Quarantined { reason: String },
    LoopPrevented,
    Forwarded { directive_messages: usize, receipt_copies: usize, rejections: usize },
}

/// Scan the outbox once, processing every receipt not already marked
/// processed. Returns one outcome per file visited, in listing order.
pub fn scan_outbox(paths: &SessionPaths) -> Result<Vec<ReceiptOutcome>, RouterError> {
    let mut outcomes = Vec::new();
    for entry in list_outbox(paths)? {
        outcomes.push(process_one(paths, &entry)?);
    }
    Ok(outcomes)
}

/// Process a single outbox file per spec §4.5 steps 1-7.
pub fn process_one(paths: &SessionPaths, entry: &PathBuf) -> Result<ReceiptOutcome, RouterError> {
    let text = match std::fs::read_to_string(entry) {
        Ok(text) => text,
        Err(source) => {
            quarantine_bad_receipt(paths, entry, &source.to_string())?;
            return Ok(ReceiptOutcome::Quarantined { reason: source.to_string() });
        }
    };

    let file_name = entry.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
    if router_receipt_processed(paths, &file_name, &text) {
        return Ok(ReceiptOutcome::AlreadyProcessed);
    }

    let receipt = match Receipt::parse(&text) {
        Ok(receipt) => receipt,
        Err(source) => {
            quarantine_bad_receipt(paths, entry, &source.to_string())?;
            return Ok(ReceiptOutcome::Quarantined { reason: source.to_string() });
        }
    };

    if receipt.request_from.as_str() == "router" {
        write_router_processed(paths, &file_name, &text)?;
        return Ok(ReceiptOutcome::LoopPrevented);
    }

    let known_roles = sort_roles(paths.discover_roles().map_err(RouterError::RoleDiscovery)?);

    let mut directive_messages = 0;
    let mut rejections = 0;
    for directive in taskbus_core::parse_directives(&receipt.body) {
        for decision in evaluate_directive(&directive, &receipt.role, &known_roles) {
            match decision {
                DirectiveDecision::Forward { to, intent, risk, message, accept } => {
                    let envelope = Message {
                        id: MessageId::new(),
                        from: receipt.role.clone(),
                        to,
                        intent,
                        thread: receipt.thread.clone(),
                        risk,
                        task_id: receipt.task_id,
                        acceptance: accept.into_iter().collect(),
                        body: message,
                    };
                    enqueue_message(paths, &envelope)?;
                    directive_messages += 1;
                }
                DirectiveDecision::Reject { reason } => {
                    if known_roles.contains(&Role::lead()) {
                        let alert = Message {
                            id: MessageId::new(),
                            from: Role::new("router"),
                            to: Role::lead(),
                            intent: Intent::Alert,
                            thread: receipt.thread.clone(),
                            risk: Risk::Medium,
                            task_id: receipt.task_id,
                            acceptance: Vec::new(),
                            body: reason,
                        };
                        enqueue_message(paths, &alert)?;
                    }
                    rejections += 1;
                }
            }
        }
    }

    let (forward_intent, forward_risk) = receipt_forward_intent_risk(receipt.status);
    let mut receipt_copies = 0;
    for to in receipt_forward_targets(&receipt, &known_roles) {
        let envelope = Message {
            id: MessageId::new(),
            from: Role::new("router"),
            to,
            intent: forward_intent.clone(),
            thread: receipt.thread.clone(),
            risk: forward_risk,
            task_id: receipt.task_id,
            acceptance: Vec::new(),
            body: fence_receipt(&text),
        };
        enqueue_message(paths, &envelope)?;
        receipt_copies += 1;
    }

    write_router_processed(paths, &file_name, &text)?;
    Ok(ReceiptOutcome::Forwarded { directive_messages, receipt_copies, rejections })
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
