// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbox message envelope (spec §3, §6).

use crate::frontmatter::{self, Frontmatter};
use crate::intent::{Intent, Risk};
use crate::role::Role;
use crate::task::TaskId;
use std::str::FromStr;

crate::define_id! {
    /// Unique message id: `{ts}-{rand}` style ids from the original tool
    /// parse fine too, since an `IdBuf` is just a bounded string.
    pub struct MessageId("m-");
}

/// A message read from or written to `bus/inbox/<role>/<mid>.md`.
///
/// Immutable once enqueued: workers move (never copy) the underlying
/// file to `archive/<role>/` on success or `deadletter/<role>/` on
/// terminal failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub from: Role,
    pub to: Role,
    pub intent: Intent,
    pub thread: String,
    pub risk: Risk,
    pub task_id: Option<TaskId>,
    pub acceptance: Vec<String>,
    pub body: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MessageParseError {
    #[error("missing required frontmatter field {0:?}")]
    MissingField(&'static str),
    #[error("invalid risk level: {0}")]
    InvalidRisk(#[from] crate::intent::InvalidRisk),
}

impl Message {
    /// Serialize to the frontmatter envelope text written to disk.
    pub fn to_text(&self) -> String {
        let mut fm = Frontmatter::new();
        fm.set("id", self.id.as_str())
            .set("from", self.from.as_str())
            .set("to", self.to.as_str())
            .set("intent", self.intent.as_str())
            .set("thread", self.thread.as_str())
            .set("risk", self.risk.to_string());
        if let Some(task_id) = &self.task_id {
            fm.set("task_id", task_id.as_str());
        }
        if !self.acceptance.is_empty() {
            fm.set("acceptance", self.acceptance.clone());
        }
        frontmatter::emit(&fm, &self.body)
    }

    /// Parse a message envelope from raw file text.
    pub fn parse(text: &str) -> Result<Self, MessageParseError> {
        let (fm, body) = frontmatter::parse(text);
        let id = fm
            .get_scalar("id")
            .ok_or(MessageParseError::MissingField("id"))?;
        let from = fm
            .get_scalar("from")
            .ok_or(MessageParseError::MissingField("from"))?;
        let to = fm
            .get_scalar("to")
            .ok_or(MessageParseError::MissingField("to"))?;
        let intent = fm
            .get_scalar("intent")
            .ok_or(MessageParseError::MissingField("intent"))?;
        let thread = fm
            .get_scalar("thread")
            .ok_or(MessageParseError::MissingField("thread"))?;
        let risk = fm.get_scalar("risk").unwrap_or("medium");

        Ok(Message {
            id: MessageId::from_string(id),
            from: Role::new(from),
            to: Role::new(to),
            intent: Intent::from_str(intent).unwrap_or(Intent::Other(intent.to_string())),
            thread: thread.to_string(),
            risk: Risk::from_str(risk)?,
            task_id: fm.get_scalar("task_id").map(TaskId::from_string),
            acceptance: fm.get_list("acceptance").map(|l| l.to_vec()).unwrap_or_default(),
            body,
        })
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
