// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `taskbus supervisor` (spec §6, §4.6).

use std::time::Duration;

use taskbus_daemon::{Supervisor, SupervisorOptions};

use crate::cli::SupervisorArgs;
use crate::exit_error::ExitError;
use crate::session::resolve_session;

pub async fn run(args: SupervisorArgs) -> Result<(), ExitError> {
    let paths = resolve_session(&args.session)?;
    let exe = std::env::current_exe().map_err(|source| ExitError::new(2, format!("could not resolve own executable: {source}")))?;
    let options = SupervisorOptions { exe, poll: Duration::from_secs(args.poll), dry_run: args.dry_run, model: args.model, serial: args.serial };
    let supervisor = Supervisor::new(paths, options).map_err(|source| ExitError::new(2, format!("supervisor setup failed: {source}")))?;
    supervisor
        .run(crate::commands::shutdown_signal())
        .await
        .map_err(|source| ExitError::new(2, format!("supervisor failed: {source}")))
}
