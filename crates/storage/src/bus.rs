// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbox/outbox/archive/deadletter file I/O and the message/receipt
//! dedup sentinels (spec §3, §4.4, §4.5).
//!
//! This module owns the filesystem operations; message/receipt text
//! encoding lives in `taskbus_core::{message, receipt}`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use taskbus_core::{Message, MessageParseError, Receipt, ReceiptParseError, Role};

use crate::fsutil::atomic_write;
use crate::session::SessionPaths;

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("malformed message at {path}: {source}")]
    Message {
        path: String,
        #[source]
        source: MessageParseError,
    },
    #[error("malformed receipt at {path}: {source}")]
    Receipt {
        path: String,
        #[source]
        source: ReceiptParseError,
    },
}

/// Write a message to its role's inbox.
pub fn enqueue_message(paths: &SessionPaths, message: &Message) -> Result<PathBuf, BusError> {
    let path = paths.inbox_message(&message.to, message.id.as_str());
    atomic_write(&path, &message.to_text()).map_err(|source| BusError::Io { path: path.display().to_string(), source })?;
    Ok(path)
}

pub fn write_receipt(paths: &SessionPaths, receipt: &Receipt) -> Result<PathBuf, BusError> {
    let path = paths.outbox_receipt(receipt.id.as_str(), &receipt.role);
    atomic_write(&path, &receipt.to_text()).map_err(|source| BusError::Io { path: path.display().to_string(), source })?;
    Ok(path)
}

/// Inbox entries sorted by file name (which embeds the message's
/// lexicographic creation order), per spec §4.4 selection step.
pub fn list_inbox(paths: &SessionPaths, role: &Role) -> Result<Vec<PathBuf>, BusError> {
    let dir = paths.inbox_dir(role);
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut entries = Vec::new();
    for entry in fs::read_dir(&dir).map_err(|source| BusError::Io { path: dir.display().to_string(), source })? {
        let entry = entry.map_err(|source| BusError::Io { path: dir.display().to_string(), source })?;
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            entries.push(entry.path());
        }
    }
    entries.sort();
    Ok(entries)
}

pub fn list_outbox(paths: &SessionPaths) -> Result<Vec<PathBuf>, BusError> {
    let dir = paths.outbox_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut entries = Vec::new();
    for entry in fs::read_dir(&dir).map_err(|source| BusError::Io { path: dir.display().to_string(), source })? {
        let entry = entry.map_err(|source| BusError::Io { path: dir.display().to_string(), source })?;
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            entries.push(entry.path());
        }
    }
    entries.sort();
    Ok(entries)
}

pub fn read_message(path: &Path) -> Result<Message, BusError> {
    let text = fs::read_to_string(path).map_err(|source| BusError::Io { path: path.display().to_string(), source })?;
    Message::parse(&text).map_err(|source| BusError::Message { path: path.display().to_string(), source })
}

pub fn read_receipt(path: &Path) -> Result<Receipt, BusError> {
    let text = fs::read_to_string(path).map_err(|source| BusError::Io { path: path.display().to_string(), source })?;
    Receipt::parse(&text).map_err(|source| BusError::Receipt { path: path.display().to_string(), source })
}

fn move_file(from: &Path, to: &Path) -> Result<(), BusError> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|source| BusError::Io { path: parent.display().to_string(), source })?;
    }
    fs::rename(from, to).map_err(|source| BusError::Io { path: to.display().to_string(), source })
}

/// Move a processed inbox message to `state/archive/<role>/`.
pub fn archive_message(paths: &SessionPaths, role: &Role, message_id: &str, from: &Path) -> Result<(), BusError> {
    move_file(from, &paths.archive_message(role, message_id))
}

/// Move a terminally failed inbox message to `bus/deadletter/<role>/`.
pub fn deadletter_message(paths: &SessionPaths, role: &Role, message_id: &str, from: &Path) -> Result<(), BusError> {
    move_file(from, &paths.deadletter_message(role, message_id))
}

/// Completion sentinel for `(message_id, role)` (spec §3 message dedup).
pub fn done_sentinel_exists(paths: &SessionPaths, message_id: &str, role: &Role) -> bool {
    paths.done_sentinel(message_id, role).exists()
}

pub fn write_done_sentinel(paths: &SessionPaths, message_id: &str, role: &Role) -> Result<(), BusError> {
    let path = paths.done_sentinel(message_id, role);
    atomic_write(&path, "").map_err(|source| BusError::Io { path: path.display().to_string(), source })
}

/// SHA-256 of `text`, hex-encoded — used for receipt dedup (spec §3, §4.5).
pub fn sha256_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Whether `receipt_file_name`'s current content hash matches the
/// stored processed sentinel (spec §4.5 step 2: router dedup).
pub fn router_receipt_processed(paths: &SessionPaths, receipt_file_name: &str, current_text: &str) -> bool {
    let path = paths.router_processed_hash(receipt_file_name);
    match fs::read_to_string(&path) {
        Ok(stored) => stored.trim() == sha256_text(current_text),
        Err(_) => false,
    }
}

pub fn write_router_processed(paths: &SessionPaths, receipt_file_name: &str, current_text: &str) -> Result<(), BusError> {
    let path = paths.router_processed_hash(receipt_file_name);
    atomic_write(&path, &sha256_text(current_text)).map_err(|source| BusError::Io { path: path.display().to_string(), source })
}

/// Quarantine an unreadable/unparsable receipt: rename into
/// `state/router/bad-receipts/` with a sibling `<name>.error.txt`.
pub fn quarantine_bad_receipt(paths: &SessionPaths, from: &Path, error: &str) -> Result<(), BusError> {
    let dir = paths.router_bad_receipts_dir();
    fs::create_dir_all(&dir).map_err(|source| BusError::Io { path: dir.display().to_string(), source })?;
    let name = from.file_name().and_then(|n| n.to_str()).unwrap_or("receipt").to_string();
    let target = dir.join(&name);
    move_file(from, &target)?;
    let error_path = dir.join(format!("{name}.error.txt"));
    atomic_write(&error_path, error).map_err(|source| BusError::Io { path: error_path.display().to_string(), source })
}

/// Per-message-per-role retry counter (spec §4.4 retry policy).
pub fn read_retry_count(paths: &SessionPaths, message_id: &str, role: &Role) -> u32 {
    let path = paths.processing_retries(message_id, role);
    match fs::read_to_string(&path) {
        Ok(text) => serde_json::from_str::<RetryCounter>(&text).map(|c| c.count).unwrap_or(0),
        Err(_) => 0,
    }
}

pub fn write_retry_count(paths: &SessionPaths, message_id: &str, role: &Role, count: u32) -> Result<(), BusError> {
    let path = paths.processing_retries(message_id, role);
    let text = serde_json::to_string(&RetryCounter { count }).unwrap_or_else(|_| "{\"count\":0}".to_string());
    atomic_write(&path, &text).map_err(|source| BusError::Io { path: path.display().to_string(), source })
}

#[derive(serde::Serialize, serde::Deserialize)]
struct RetryCounter {
    count: u32,
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
