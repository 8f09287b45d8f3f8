// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp formatting shared by the task board, messages, and receipts.
//!
//! All on-disk timestamps are UTC RFC 3339 strings (`2026-07-28T12:00:00Z`
//! style), produced from a [`crate::clock::Clock`]'s epoch milliseconds so
//! tests can pin exact values with a `FakeClock`.

use crate::clock::Clock;
use chrono::{DateTime, Utc};

/// Format the clock's current time as an RFC 3339 UTC timestamp.
pub fn now_rfc3339(clock: &impl Clock) -> String {
    epoch_ms_to_rfc3339(clock.epoch_ms())
}

pub fn epoch_ms_to_rfc3339(epoch_ms: u64) -> String {
    let secs = (epoch_ms / 1000) as i64;
    let nanos = ((epoch_ms % 1000) * 1_000_000) as u32;
    DateTime::<Utc>::from_timestamp(secs, nanos)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
        .to_rfc3339()
}

/// A compact timestamp suitable for embedding in generated ids:
/// `YYYYMMDD-HHMMSS`, matching the original tool's `_new_task_id` format.
pub fn compact_timestamp(clock: &impl Clock) -> String {
    let secs = (clock.epoch_ms() / 1000) as i64;
    DateTime::<Utc>::from_timestamp(secs, 0)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
        .format("%Y%m%d-%H%M%S")
        .to_string()
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
