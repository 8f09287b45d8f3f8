// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `taskbus router daemon|once` (spec §6, §4.5).

use std::time::Duration;

use taskbus_core::SystemClock;
use taskbus_router::{run_forever, scan_outbox};

use crate::cli::RouterCommand;
use crate::exit_error::ExitError;
use crate::session::resolve_session;

pub async fn run(command: RouterCommand) -> Result<(), ExitError> {
    match command {
        RouterCommand::Daemon { session, poll, dry_run: _dry_run } => {
            let paths = resolve_session(&session)?;
            run_forever(paths, SystemClock, Duration::from_secs(poll), crate::commands::shutdown_signal())
                .await
                .map_err(|source| ExitError::new(1, format!("router loop failed: {source}")))?;
            Err(ExitError::new(crate::commands::INTERRUPTED, "router interrupted"))
        }
        RouterCommand::Once { session, dry_run: _dry_run } => {
            let paths = resolve_session(&session)?;
            let outcomes = scan_outbox(&paths).map_err(|source| ExitError::new(1, format!("router scan failed: {source}")))?;
            if outcomes.is_empty() {
                Err(ExitError::new(3, "nothing to do"))
            } else {
                for outcome in &outcomes {
                    println!("{outcome:?}");
                }
                Ok(())
            }
        }
    }
}
