// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Supervisor's error seam (spec §4.6, §7).

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to spawn child {name:?}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not discover roles: {0}")]
    RoleDiscovery(#[source] std::io::Error),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
