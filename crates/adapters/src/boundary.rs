// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Role-boundary snapshots via `git status --porcelain` (spec §4.4,
//! `SPEC_FULL.md` §4.4: "ported from nothing in the trimmed prototype
//! ... grounded on the teacher's own use of `git status`-style diffing").

use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    #[error("failed to run git status in {dir}: {source}")]
    Spawn {
        dir: String,
        #[source]
        source: std::io::Error,
    },
    #[error("git status in {dir} exited with status {status}: {stderr}")]
    NonZeroExit { dir: String, status: i32, stderr: String },
}

/// The set of changed/untracked paths under `dir`, per `git status
/// --porcelain` (each line's path, stripping the two-character status
/// prefix; renames keep the post-rename path).
pub fn snapshot(dir: &Path) -> Result<BTreeSet<String>, BoundaryError> {
    let output = Command::new("git")
        .arg("status")
        .arg("--porcelain")
        .current_dir(dir)
        .output()
        .map_err(|source| BoundaryError::Spawn { dir: dir.display().to_string(), source })?;

    if !output.status.success() {
        return Err(BoundaryError::NonZeroExit {
            dir: dir.display().to_string(),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let text = String::from_utf8_lossy(&output.stdout);
    Ok(text
        .lines()
        .filter_map(|line| {
            let rest = line.get(3..)?;
            match rest.split_once(" -> ") {
                Some((_, renamed_to)) => Some(renamed_to.to_string()),
                None => Some(rest.to_string()),
            }
        })
        .collect())
}

/// Paths present in `after` but not `before` — any new path is a
/// role-boundary violation for non-builder roles (spec §4.4).
pub fn boundary_violations(before: &BTreeSet<String>, after: &BTreeSet<String>) -> Vec<String> {
    after.difference(before).cloned().collect()
}

#[cfg(test)]
#[path = "boundary_tests.rs"]
mod tests;
