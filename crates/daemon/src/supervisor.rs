// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Supervisor (spec §4.6 C7): spawns one Router child and one
//! Worker child per discovered role, restarts any that exit
//! unexpectedly, and forwards a graceful shutdown to all of them.
//!
//! Children are invoked as `<exe> router daemon ...` / `<exe> worker
//! daemon --role <role> ...`, matching the CLI surface documented in
//! spec §6 — the supervisor assumes its own binary implements that
//! grammar.

use std::path::PathBuf;
use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use taskbus_core::sort_roles;
use taskbus_storage::SessionPaths;

use crate::child::{spawn_child, ManagedChild};
use crate::diagnostics::capture_ps_snapshot;
use crate::error::DaemonError;
use crate::pidfile::write_pids;

const RESTART_BACKOFF: Duration = Duration::from_millis(500);
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    /// Path to this same binary, used to spawn children.
    pub exe: PathBuf,
    pub poll: Duration,
    pub dry_run: bool,
    pub model: Option<String>,
    /// `--serial`: serialize tool invocations across all workers via
    /// `AUTOPILOT_GLOBAL_LOCK=1` in every child's environment.
    pub serial: bool,
}

struct ChildSpec {
    name: String,
    args: Vec<String>,
}

pub struct Supervisor {
    paths: SessionPaths,
    options: SupervisorOptions,
    specs: Vec<ChildSpec>,
    children: Vec<ManagedChild>,
}

impl Supervisor {
    pub fn new(paths: SessionPaths, options: SupervisorOptions) -> Result<Self, DaemonError> {
        let roles = sort_roles(paths.discover_roles().map_err(DaemonError::RoleDiscovery)?);
        let session = paths.root().display().to_string();
        let poll_secs = options.poll.as_secs().to_string();

        let mut specs = vec![ChildSpec {
            name: "router".to_string(),
            args: router_args(&session, &poll_secs, options.dry_run),
        }];
        for role in roles {
            specs.push(ChildSpec {
                name: role.as_str().to_string(),
                args: worker_args(&session, &poll_secs, role.as_str(), options.dry_run, options.model.as_deref()),
            });
        }

        Ok(Self { paths, options, specs, children: Vec::new() })
    }

    pub fn child_count(&self) -> usize {
        self.specs.len()
    }

    fn extra_env(&self) -> Vec<(&'static str, String)> {
        if self.options.serial {
            vec![("AUTOPILOT_GLOBAL_LOCK", "1".to_string())]
        } else {
            Vec::new()
        }
    }

    fn spawn_all(&mut self) -> Result<(), DaemonError> {
        let env = self.extra_env();
        for spec in &self.specs {
            let log_path = self.paths.component_log(&spec.name);
            let child = spawn_child(&self.options.exe, &spec.name, &spec.args, &log_path, &env)?;
            tracing::info!(name = %spec.name, pid = child.pid(), "spawned child");
            self.children.push(child);
        }
        write_pids(&self.paths, &self.children)
    }

    fn respawn(&mut self, index: usize) -> Result<(), DaemonError> {
        let spec = &self.specs[index];
        let env = self.extra_env();
        let log_path = self.paths.component_log(&spec.name);
        let child = spawn_child(&self.options.exe, &spec.name, &spec.args, &log_path, &env)?;
        tracing::info!(name = %spec.name, pid = child.pid(), "respawned child");
        self.children[index] = child;
        write_pids(&self.paths, &self.children)
    }

    /// Poll every child; log and respawn any that have exited while the
    /// stop flag is not set (the caller only calls this outside shutdown).
    fn reap_and_respawn(&mut self) -> Result<(), DaemonError> {
        let mut to_respawn = Vec::new();
        for (index, child) in self.children.iter_mut().enumerate() {
            match child.try_wait() {
                Ok(Some(status)) => {
                    tracing::warn!(name = %child.name, ?status, "child exited unexpectedly");
                    match capture_ps_snapshot() {
                        Some(snapshot) => tracing::warn!(name = %child.name, %snapshot, "ps snapshot at exit"),
                        None => tracing::warn!("ps unavailable; skipping exit diagnostics"),
                    }
                    to_respawn.push(index);
                }
                Ok(None) => {}
                Err(source) => tracing::warn!(name = %child.name, %source, "failed to poll child status"),
            }
        }
        if !to_respawn.is_empty() {
            // Avoid a tight respawn loop if a child is crash-looping.
            std::thread::sleep(RESTART_BACKOFF);
        }
        for index in to_respawn {
            self.respawn(index)?;
        }
        Ok(())
    }

    async fn terminate_all(&mut self) {
        for child in &self.children {
            let _ = kill(Pid::from_raw(child.pid() as i32), Signal::SIGTERM);
        }
        let deadline = tokio::time::Instant::now() + TERMINATE_GRACE;
        while tokio::time::Instant::now() < deadline {
            let all_exited = self.children.iter_mut().all(|c| matches!(c.try_wait(), Ok(Some(_))));
            if all_exited {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        for child in &mut self.children {
            if matches!(child.try_wait(), Ok(None)) {
                let _ = child.kill();
            }
        }
    }

    /// Spawn every child, then supervise until `shutdown` resolves.
    pub async fn run<F>(mut self, shutdown: F) -> Result<(), DaemonError>
    where
        F: std::future::Future<Output = ()>,
    {
        self.spawn_all()?;
        tokio::pin!(shutdown);
        let mut heartbeat = tokio::time::interval(Duration::from_secs(30));
        heartbeat.tick().await;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    self.terminate_all().await;
                    return Ok(());
                }
                _ = heartbeat.tick() => {
                    tracing::info!(children = self.children.len(), "supervisor heartbeat");
                }
                _ = tokio::time::sleep(self.options.poll) => {
                    self.reap_and_respawn()?;
                }
            }
        }
    }
}

fn router_args(session: &str, poll_secs: &str, dry_run: bool) -> Vec<String> {
    let mut args = vec![
        "router".to_string(),
        "daemon".to_string(),
        "--session".to_string(),
        session.to_string(),
        "--poll".to_string(),
        poll_secs.to_string(),
    ];
    if dry_run {
        args.push("--dry-run".to_string());
    }
    args
}

fn worker_args(session: &str, poll_secs: &str, role: &str, dry_run: bool, model: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "worker".to_string(),
        "daemon".to_string(),
        "--session".to_string(),
        session.to_string(),
        "--role".to_string(),
        role.to_string(),
        "--poll".to_string(),
        poll_secs.to_string(),
    ];
    if dry_run {
        args.push("--dry-run".to_string());
    }
    if let Some(model) = model {
        args.push("--model".to_string());
        args.push(model.to_string());
    }
    args
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
