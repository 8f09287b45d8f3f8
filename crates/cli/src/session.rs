// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session/role resolution shared by every subcommand: turn a `--session`
//! path and a `--role` name into validated `SessionPaths`/`Role` values,
//! or a code-2 `ExitError` (spec §6: "2 invalid session/role").

use std::path::Path;

use taskbus_core::Role;
use taskbus_storage::SessionPaths;

use crate::exit_error::ExitError;

pub fn resolve_session(root: &Path) -> Result<SessionPaths, ExitError> {
    if !root.is_dir() {
        return Err(ExitError::new(2, format!("session path {} is not a directory", root.display())));
    }
    Ok(SessionPaths::new(root))
}

pub fn resolve_role(paths: &SessionPaths, role: &str) -> Result<Role, ExitError> {
    let roles = paths
        .discover_roles()
        .map_err(|source| ExitError::new(2, format!("could not discover roles: {source}")))?;
    let role = Role::new(role);
    if roles.contains(&role) {
        Ok(role)
    } else {
        Err(ExitError::new(2, format!("unknown role {role:?}: no roles/{role}/ directory under the session")))
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
