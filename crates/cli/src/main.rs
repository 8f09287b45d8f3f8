// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `taskbus`: the operator-facing entry point over the task bus (spec §6).
//!
//! Every subcommand returns `Result<(), ExitError>`; this is the only
//! place in the crate that calls `std::process::exit`.

mod cli;
mod commands;
mod exit_error;
mod logging;
mod session;

use clap::Parser;

use cli::{Cli, Command};
use exit_error::ExitError;

#[tokio::main]
async fn main() {
    logging::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Worker(args) => commands::worker::run(args.command).await,
        Command::Router(args) => commands::router::run(args.command).await,
        Command::Supervisor(args) => commands::supervisor::run(args).await,
        Command::Tasks(args) => commands::tasks::run(args.command).await,
    };

    std::process::exit(exit_code(result));
}

fn exit_code(result: Result<(), ExitError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            if !err.message.is_empty() {
                eprintln!("taskbus: {}", err.message);
            }
            err.code
        }
    }
}
