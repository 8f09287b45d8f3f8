// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parses the `## Role worktrees` section of `SESSION.md` — the opaque
//! session-root locator this crate consumes instead of shelling out to
//! `git worktree` (`SPEC_FULL.md` §4.4).

use std::collections::HashMap;
use std::path::PathBuf;

use taskbus_core::Role;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorktreeParseError {
    #[error("SESSION.md has no \"## Role worktrees\" section")]
    SectionMissing,
}

/// Parse `- <role>: <abs path>` lines under the `## Role worktrees`
/// heading. Parsing stops at the next `## ` heading or end of file.
pub fn parse_role_worktrees(session_md: &str) -> Result<HashMap<Role, PathBuf>, WorktreeParseError> {
    let mut lines = session_md.lines();
    loop {
        match lines.next() {
            Some(line) if line.trim() == "## Role worktrees" => break,
            Some(_) => continue,
            None => return Err(WorktreeParseError::SectionMissing),
        }
    }

    let mut out = HashMap::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.starts_with("## ") {
            break;
        }
        let Some(rest) = trimmed.strip_prefix('-') else { continue };
        let rest = rest.trim();
        let Some((role, path)) = rest.split_once(':') else { continue };
        let role = role.trim();
        let path = path.trim();
        if role.is_empty() || path.is_empty() {
            continue;
        }
        out.insert(Role::new(role), PathBuf::from(path));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "worktree_tests.rs"]
mod tests;
