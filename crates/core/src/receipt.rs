// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbox receipt envelope (spec §3, §6).

use crate::frontmatter::{self, Frontmatter};
use crate::intent::{Intent, ReceiptStatus};
use crate::message::MessageId;
use crate::role::Role;
use crate::task::TaskId;
use std::str::FromStr;

/// A receipt written to `bus/outbox/<mid>.<role>.md` describing how a
/// role handled one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub id: MessageId,
    pub role: Role,
    pub thread: String,
    pub request_from: Role,
    pub request_to: Role,
    pub request_intent: Intent,
    pub task_id: Option<TaskId>,
    pub status: ReceiptStatus,
    pub codex_rc: i32,
    pub finished_at: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReceiptParseError {
    #[error("missing required frontmatter field {0:?}")]
    MissingField(&'static str),
    #[error("invalid receipt status: {0}")]
    InvalidStatus(#[from] crate::intent::InvalidReceiptStatus),
    #[error("non-integer codex_rc: {0:?}")]
    InvalidCodexRc(String),
}

impl Receipt {
    /// The on-disk file name: `<mid>.<role>.md`.
    pub fn file_name(&self) -> String {
        format!("{}.{}.md", self.id.as_str(), self.role.as_str())
    }

    pub fn to_text(&self) -> String {
        let mut fm = Frontmatter::new();
        fm.set("id", self.id.as_str())
            .set("role", self.role.as_str())
            .set("thread", self.thread.as_str())
            .set("request_from", self.request_from.as_str())
            .set("request_to", self.request_to.as_str())
            .set("request_intent", self.request_intent.as_str());
        if let Some(task_id) = &self.task_id {
            fm.set("task_id", task_id.as_str());
        }
        fm.set("status", self.status.to_string())
            .set("codex_rc", self.codex_rc.to_string())
            .set("finished_at", self.finished_at.as_str());
        frontmatter::emit(&fm, &self.body)
    }

    pub fn parse(text: &str) -> Result<Self, ReceiptParseError> {
        let (fm, body) = frontmatter::parse(text);
        let id = fm.get_scalar("id").ok_or(ReceiptParseError::MissingField("id"))?;
        let role = fm.get_scalar("role").ok_or(ReceiptParseError::MissingField("role"))?;
        let thread = fm.get_scalar("thread").ok_or(ReceiptParseError::MissingField("thread"))?;
        let request_from = fm
            .get_scalar("request_from")
            .ok_or(ReceiptParseError::MissingField("request_from"))?;
        let request_to = fm
            .get_scalar("request_to")
            .ok_or(ReceiptParseError::MissingField("request_to"))?;
        let request_intent = fm
            .get_scalar("request_intent")
            .ok_or(ReceiptParseError::MissingField("request_intent"))?;
        let status = fm.get_scalar("status").ok_or(ReceiptParseError::MissingField("status"))?;
        let codex_rc = fm
            .get_scalar("codex_rc")
            .ok_or(ReceiptParseError::MissingField("codex_rc"))?;
        let finished_at = fm
            .get_scalar("finished_at")
            .ok_or(ReceiptParseError::MissingField("finished_at"))?;

        Ok(Receipt {
            id: MessageId::from_string(id),
            role: Role::new(role),
            thread: thread.to_string(),
            request_from: Role::new(request_from),
            request_to: Role::new(request_to),
            request_intent: Intent::from_str(request_intent)
                .unwrap_or(Intent::Other(request_intent.to_string())),
            task_id: fm.get_scalar("task_id").map(TaskId::from_string),
            status: ReceiptStatus::from_str(status)?,
            codex_rc: codex_rc
                .parse()
                .map_err(|_| ReceiptParseError::InvalidCodexRc(codex_rc.to_string()))?,
            finished_at: finished_at.to_string(),
            body,
        })
    }
}

#[cfg(test)]
#[path = "receipt_tests.rs"]
mod tests;
