// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Role identity and the default dispatch ordering.

use std::fmt;

/// The fixed default role ordering used when discovering roles under
/// `roles/` and when the router decides which recipient to notify first.
///
/// A session is not required to have exactly these five roles — any
/// role directory present under `roles/` is discovered; unknown roles
/// are appended after this fixed order (see `SPEC_FULL.md` §9).
pub const ROLE_ORDER: &[&str] = &["lead", "builder-a", "builder-b", "reviewer", "tester"];

/// A role name, e.g. `"lead"` or `"builder-a"`.
///
/// Kept as a thin string newtype rather than a closed enum: sessions
/// may define custom roles beyond [`ROLE_ORDER`], and the coordination
/// core never needs to match exhaustively on role identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn lead() -> Self {
        Self::new("lead")
    }

    /// Rank of this role in [`ROLE_ORDER`], or `usize::MAX` if the role
    /// is not one of the fixed defaults (sorts after all known roles).
    pub fn rank(&self) -> usize {
        ROLE_ORDER.iter().position(|r| *r == self.0).unwrap_or(usize::MAX)
    }

    pub fn is_lead(&self) -> bool {
        self.0 == "lead"
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Sort a list of discovered role names: fixed [`ROLE_ORDER`] first (in
/// that order), then any remaining custom roles in their discovery order.
pub fn sort_roles(mut roles: Vec<Role>) -> Vec<Role> {
    roles.sort_by_key(|r| r.rank());
    roles
}

#[cfg(test)]
#[path = "role_tests.rs"]
mod tests;
