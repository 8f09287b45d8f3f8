// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Role memory trimming and append helpers (spec §4.4, `SPEC_FULL.md`
//! §9 Open Question #3). Pure string manipulation — callers own the
//! file read/write at `state/memory/<role>.md`.

/// `max(prompt_lines * 2, 80)`, the bound under which a role-memory
/// tail is kept before being fed into an invocation prompt.
pub fn trim_bound(prompt_lines: usize) -> usize {
    (prompt_lines * 2).max(80)
}

/// The last `max_lines` lines of `text`, joined back with `\n`.
pub fn tail(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

/// Append `record` to `existing`, truncating from the front (whole
/// lines only) so the result stays within `max_bytes`.
pub fn append_record(existing: &str, record: &str, max_bytes: u64) -> String {
    let mut combined = if existing.is_empty() {
        record.to_string()
    } else {
        format!("{existing}\n{record}")
    };
    let max_bytes = max_bytes as usize;
    while combined.len() > max_bytes {
        match combined.find('\n') {
            Some(idx) => combined = combined[idx + 1..].to_string(),
            None => {
                combined.truncate(max_bytes);
                break;
            }
        }
    }
    combined
}

#[cfg(test)]
#[path = "role_memory_tests.rs"]
mod tests;
