// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drops non-UTF-8 environment variables before spawning the external
//! tool (spec §4.4: "Non-UTF-8 environment variables are dropped
//! before the child is spawned").

use std::env::VarsOs;

/// The current process environment, with any variable whose name or
/// value is not valid UTF-8 silently dropped.
pub fn sanitized_env() -> Vec<(String, String)> {
    filter_env(std::env::vars_os())
}

fn filter_env(vars: VarsOs) -> Vec<(String, String)> {
    vars.filter_map(|(k, v)| match (k.into_string(), v.into_string()) {
        (Ok(k), Ok(v)) => Some((k, v)),
        _ => None,
    })
    .collect()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
