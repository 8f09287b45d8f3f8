// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy (spec §7), independent of any one crate's I/O details.
//!
//! Each crate defines its own `thiserror` enum at its seams; this module
//! holds the small, cross-cutting result kinds that more than one crate's
//! operations return (task board outcomes, lock acquisition).

use std::fmt;

/// A lock-acquisition failure. Distinguished from I/O errors because
/// callers branch on `Timeout` specifically (continue scanning) versus
/// genuine filesystem errors (log and skip).
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("timed out acquiring lock at {path}")]
    Timeout { path: String },
    #[error("io error operating on lock at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Task-board mutation outcomes that are not simple booleans, per spec §4.3.
///
/// Each non-`Ok` variant documents the `task_board.py` reason string it is
/// wire-compatible with, since the CLI (`tasks` subcommand) prints text
/// matching the original tool's conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcomeKind {
    /// reason "ok"
    Ok,
    /// reason "not_found"
    NotFound,
    /// reason "already_dispatched_same"
    AlreadyDispatchedSame,
    /// reason "already_dispatched"
    AlreadyDispatched,
    /// reason "already_claimed"
    AlreadyClaimed,
    /// reason "claimed_by_other"
    ClaimedByOther,
    /// reason "owner_mismatch"
    OwnerMismatch,
    /// reason "deps_blocked:<csv>"
    DepsBlocked(Vec<String>),
    /// reason "completed"
    Completed,
    /// reason "failed"
    Failed,
    /// reason "already_completed"
    AlreadyCompleted,
    /// reason "not_in_progress"
    NotInProgress,
    /// reason "updated"
    Updated,
    /// reason "none_available"
    NoneAvailable,
    /// reason "invalid_status"
    InvalidStatus,
    /// reason "claimed"
    Claimed,
}

impl TaskOutcomeKind {
    /// The `task_board.py`-compatible reason string.
    pub fn reason(&self) -> String {
        match self {
            Self::Ok => "ok".to_string(),
            Self::NotFound => "not_found".to_string(),
            Self::AlreadyDispatchedSame => "already_dispatched_same".to_string(),
            Self::AlreadyDispatched => "already_dispatched".to_string(),
            Self::AlreadyClaimed => "already_claimed".to_string(),
            Self::ClaimedByOther => "claimed_by_other".to_string(),
            Self::OwnerMismatch => "owner_mismatch".to_string(),
            Self::DepsBlocked(ids) => format!("deps_blocked:{}", ids.join(",")),
            Self::Completed => "completed".to_string(),
            Self::Failed => "failed".to_string(),
            Self::AlreadyCompleted => "already_completed".to_string(),
            Self::NotInProgress => "not_in_progress".to_string(),
            Self::Updated => "updated".to_string(),
            Self::NoneAvailable => "none_available".to_string(),
            Self::InvalidStatus => "invalid_status".to_string(),
            Self::Claimed => "claimed".to_string(),
        }
    }

    /// Whether this outcome represents success (`ok=true` in the original).
    pub fn is_ok(&self) -> bool {
        matches!(
            self,
            Self::Ok
                | Self::AlreadyDispatchedSame
                | Self::AlreadyClaimed
                | Self::Completed
                | Self::AlreadyCompleted
                | Self::Updated
                | Self::Claimed
        )
    }
}

impl fmt::Display for TaskOutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
