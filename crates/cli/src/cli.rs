// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line grammar (spec §6 "CLI surface"): `worker`, `router`,
//! `supervisor`, `tasks`, each with the documented flags and exit codes.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "taskbus", version, about = "Filesystem-backed multi-agent coordination bus")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run or single-step a role's worker loop.
    Worker(WorkerArgs),
    /// Run or single-step the router.
    Router(RouterArgs),
    /// Spawn and supervise the router plus one worker per role.
    Supervisor(SupervisorArgs),
    /// Inspect and mutate the task board directly.
    Tasks(TasksArgs),
}

#[derive(Args)]
pub struct WorkerArgs {
    #[command(subcommand)]
    pub command: WorkerCommand,
}

#[derive(Subcommand)]
pub enum WorkerCommand {
    /// Run the worker loop until interrupted.
    Daemon {
        #[arg(long)]
        session: PathBuf,
        #[arg(long)]
        role: String,
        /// Poll interval in seconds, used as a fallback alongside the
        /// filesystem watch.
        #[arg(long, default_value_t = 2)]
        poll: u64,
        /// Skip invoking the external tool; useful for rehearsing a session layout.
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        model: Option<String>,
    },
    /// Process at most one inbox message, then exit.
    Once {
        #[arg(long)]
        session: PathBuf,
        #[arg(long)]
        role: String,
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        model: Option<String>,
    },
}

#[derive(Args)]
pub struct RouterArgs {
    #[command(subcommand)]
    pub command: RouterCommand,
}

#[derive(Subcommand)]
pub enum RouterCommand {
    /// Run the router loop until interrupted.
    Daemon {
        #[arg(long)]
        session: PathBuf,
        #[arg(long, default_value_t = 2)]
        poll: u64,
        #[arg(long)]
        dry_run: bool,
    },
    /// Scan the outbox once, then exit.
    Once {
        #[arg(long)]
        session: PathBuf,
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args)]
pub struct SupervisorArgs {
    #[arg(long)]
    pub session: PathBuf,
    #[arg(long, default_value_t = 2)]
    pub poll: u64,
    #[arg(long)]
    pub dry_run: bool,
    #[arg(long)]
    pub model: Option<String>,
    /// Serialize tool invocations across all workers
    /// (`AUTOPILOT_GLOBAL_LOCK=1` in every child's environment).
    #[arg(long)]
    pub serial: bool,
}

#[derive(Args)]
pub struct TasksArgs {
    #[command(subcommand)]
    pub command: TasksCommand,
}

#[derive(Subcommand)]
pub enum TasksCommand {
    /// Create an empty task board if one does not already exist.
    Init {
        #[arg(long)]
        session: PathBuf,
    },
    /// List every task, in creation order.
    List {
        #[arg(long)]
        session: PathBuf,
    },
    /// Create a new task.
    Add {
        #[arg(long)]
        session: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long = "type", default_value = "implement")]
        work_type: String,
        #[arg(long, default_value = "medium")]
        risk: String,
        #[arg(long = "accept")]
        acceptance: Vec<String>,
        #[arg(long = "depends-on")]
        depends_on: Vec<String>,
        #[arg(long, default_value = "implement")]
        intent: String,
        #[arg(long, default_value = "cli")]
        created_by: String,
    },
    /// Print one task as JSON.
    Show {
        #[arg(long)]
        session: PathBuf,
        task_id: String,
    },
    /// List tasks ready to dispatch (deps satisfied, not yet bound).
    Dispatchable {
        #[arg(long)]
        session: PathBuf,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Claim a task for a role.
    Claim {
        #[arg(long)]
        session: PathBuf,
        task_id: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        message_id: Option<String>,
    },
    /// Mark a task completed.
    Complete {
        #[arg(long)]
        session: PathBuf,
        task_id: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        evidence: Option<String>,
        #[arg(long)]
        receipt_file: Option<String>,
    },
    /// Record a failure against a task (retryable, unless `--terminal`).
    Fail {
        #[arg(long)]
        session: PathBuf,
        task_id: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        error: String,
        #[arg(long)]
        terminal: bool,
    },
    /// Bind a task to a freshly-enqueued message.
    Dispatch {
        #[arg(long)]
        session: PathBuf,
        task_id: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        intent: String,
        #[arg(long)]
        message_id: String,
    },
}
