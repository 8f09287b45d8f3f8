// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Consolidated runtime configuration (spec §6 env vars, §9 re-architecture
//! guidance: one config struct, read once at process start).

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How strictly non-builder role-boundary violations are enforced
/// (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleBoundaryMode {
    #[default]
    Enforce,
    Warn,
    Off,
}

impl FromStr for RoleBoundaryMode {
    type Err = InvalidRoleBoundaryMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enforce" => Ok(Self::Enforce),
            "warn" => Ok(Self::Warn),
            "off" => Ok(Self::Off),
            other => Err(InvalidRoleBoundaryMode(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid AUTOPILOT_ROLE_BOUNDARY_MODE: {0:?}")]
pub struct InvalidRoleBoundaryMode(pub String);

impl fmt::Display for RoleBoundaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enforce => "enforce",
            Self::Warn => "warn",
            Self::Off => "off",
        })
    }
}

/// All tunables, read once from the environment at process start
/// (spec §6, §9's "dynamic config via environment" guidance).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `AUTOPILOT_LOCK_STALE_SECONDS` — processing and global lock staleness.
    pub lock_stale_after: Duration,
    /// `TASK_BOARD_LOCK_STALE_SECONDS` — task-board lock staleness.
    pub task_board_lock_stale_after: Duration,
    /// `AUTOPILOT_DISPATCH_SCAN_SECONDS` — lead periodic dispatch timer.
    pub dispatch_scan_interval: Duration,
    /// `AUTOPILOT_DISPATCH_MAX_PER_SCAN` — dispatch batch size.
    pub dispatch_max_per_scan: usize,
    /// `AUTOPILOT_ROLE_BOUNDARY_MODE`.
    pub role_boundary_mode: RoleBoundaryMode,
    /// `AUTOPILOT_GLOBAL_LOCK` — serialize all tool invocations.
    pub global_lock_enabled: bool,
    /// `AUTOPILOT_ROLE_MEMORY_MAX_BYTES` — memory file truncation point.
    pub role_memory_max_bytes: u64,
    /// `AUTOPILOT_ROLE_MEMORY_PROMPT_LINES` — tail length fed into the prompt.
    pub role_memory_prompt_lines: usize,
    /// Open Question #1 (`SPEC_FULL.md` §9): how long a prior dispatch
    /// binding is honored before a new message may rebind the task.
    /// Defaults to zero (always stale) per the spec's own recommendation.
    pub dispatch_stale_after: Duration,
    /// `AUTOPILOT_CODEGEN_BIN` — external tool binary name.
    pub codegen_bin: String,
    /// `AUTOPILOT_MODEL` — external tool model override, if any.
    pub model: Option<String>,
    /// Task-board lock acquisition timeout (short; spec §5: "~10s").
    pub task_board_lock_timeout: Duration,
    /// Global serialization lock timeout (long; spec §5: "up to 30 min").
    pub global_lock_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_stale_after: Duration::from_secs(21_600),
            task_board_lock_stale_after: Duration::from_secs(21_600),
            dispatch_scan_interval: Duration::from_secs(5),
            dispatch_max_per_scan: 3,
            role_boundary_mode: RoleBoundaryMode::Enforce,
            global_lock_enabled: false,
            role_memory_max_bytes: 65_536,
            role_memory_prompt_lines: 40,
            dispatch_stale_after: Duration::ZERO,
            codegen_bin: "codex".to_string(),
            model: None,
            task_board_lock_timeout: Duration::from_secs(10),
            global_lock_timeout: Duration::from_secs(30 * 60),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => v.trim() == "1",
        Err(_) => default,
    }
}

impl Config {
    /// Read all tunables from the environment, falling back to the
    /// documented defaults for anything absent or malformed.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            lock_stale_after: Duration::from_secs(env_u64(
                "AUTOPILOT_LOCK_STALE_SECONDS",
                defaults.lock_stale_after.as_secs(),
            )),
            task_board_lock_stale_after: Duration::from_secs(env_u64(
                "TASK_BOARD_LOCK_STALE_SECONDS",
                defaults.task_board_lock_stale_after.as_secs(),
            )),
            dispatch_scan_interval: Duration::from_secs(env_u64(
                "AUTOPILOT_DISPATCH_SCAN_SECONDS",
                defaults.dispatch_scan_interval.as_secs(),
            )),
            dispatch_max_per_scan: env_usize(
                "AUTOPILOT_DISPATCH_MAX_PER_SCAN",
                defaults.dispatch_max_per_scan,
            ),
            role_boundary_mode: env::var("AUTOPILOT_ROLE_BOUNDARY_MODE")
                .ok()
                .and_then(|v| RoleBoundaryMode::from_str(&v).ok())
                .unwrap_or(defaults.role_boundary_mode),
            global_lock_enabled: env_bool("AUTOPILOT_GLOBAL_LOCK", defaults.global_lock_enabled),
            role_memory_max_bytes: env_u64(
                "AUTOPILOT_ROLE_MEMORY_MAX_BYTES",
                defaults.role_memory_max_bytes,
            ),
            role_memory_prompt_lines: env_usize(
                "AUTOPILOT_ROLE_MEMORY_PROMPT_LINES",
                defaults.role_memory_prompt_lines,
            ),
            codegen_bin: env::var("AUTOPILOT_CODEGEN_BIN").unwrap_or(defaults.codegen_bin),
            model: env::var("AUTOPILOT_MODEL").ok(),
            ..defaults
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
