// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure capability and forwarding policy (spec §4.5 steps 4-6).
//!
//! Nothing here touches the filesystem; `router.rs` owns applying these
//! decisions as inbox writes.

use std::str::FromStr;

use taskbus_core::{Directive, DirectiveTarget, Intent, Receipt, ReceiptStatus, Risk, Role};

/// What to do with one resolved target of a parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveDecision {
    Forward { to: Role, intent: Intent, risk: Risk, message: String, accept: Option<String> },
    Reject { reason: String },
}

/// Evaluate one directive against the capability policy, producing one
/// decision per resolved target (`to="all"` and `to="r1,r2"` both expand
/// to multiple decisions).
pub fn evaluate_directive(directive: &Directive, sender: &Role, known_roles: &[Role]) -> Vec<DirectiveDecision> {
    let intent = Intent::from_str(&directive.intent).unwrap_or_else(|_| Intent::Other(directive.intent.clone()));
    let risk = directive
        .risk
        .as_deref()
        .and_then(|r| Risk::from_str(r).ok())
        .unwrap_or_default();

    resolve_targets(&directive.to, sender, known_roles)
        .into_iter()
        .map(|target| match target {
            Ok(to) if sender.is_lead() || intent.allowed_for_non_lead() => DirectiveDecision::Forward {
                to,
                intent: intent.clone(),
                risk,
                message: directive.message.clone(),
                accept: directive.accept.clone(),
            },
            Ok(to) => DirectiveDecision::Reject {
                reason: format!("role {sender} is not permitted to emit intent {intent:?} (directive to {to})"),
            },
            Err(name) => DirectiveDecision::Reject {
                reason: format!("directive names unknown role {name:?}"),
            },
        })
        .collect()
}

fn resolve_targets(target: &DirectiveTarget, sender: &Role, known_roles: &[Role]) -> Vec<Result<Role, String>> {
    match target {
        DirectiveTarget::All => known_roles
            .iter()
            .filter(|r| *r != sender)
            .map(|r| Ok(r.clone()))
            .collect(),
        DirectiveTarget::Roles(names) => names
            .iter()
            .map(|name| {
                known_roles
                    .iter()
                    .find(|r| r.as_str() == name)
                    .cloned()
                    .ok_or_else(|| name.clone())
            })
            .collect(),
    }
}

/// Intent/risk for the forwarded copy of the receipt itself (spec §4.5
/// step 6): `alert`/`medium` for a retried or dead-lettered receipt,
/// `receipt`/`low` otherwise.
pub fn receipt_forward_intent_risk(status: ReceiptStatus) -> (Intent, Risk) {
    match status {
        ReceiptStatus::Retry | ReceiptStatus::Deadletter => (Intent::Alert, Risk::Medium),
        ReceiptStatus::Done | ReceiptStatus::Warn => (Intent::Receipt, Risk::Low),
    }
}

/// Who receives the forwarded copy of a receipt: Lead (always, if
/// present) and `request_from` (if a valid role distinct from Lead).
pub fn receipt_forward_targets(receipt: &Receipt, known_roles: &[Role]) -> Vec<Role> {
    let lead = Role::lead();
    let mut targets = Vec::new();
    if known_roles.contains(&lead) {
        targets.push(lead.clone());
    }
    if receipt.request_from != lead && known_roles.contains(&receipt.request_from) {
        targets.push(receipt.request_from.clone());
    }
    targets
}

/// Wrap a receipt's raw text in a fenced block for embedding in the body
/// of a forwarded message (spec §4.5 step 6).
pub fn fence_receipt(receipt_text: &str) -> String {
    format!("```\n{receipt_text}\n```")
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
