// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic write-then-rename helper shared by the task board and bus
//! modules (spec §4.2/§9: write to `.tmp.<name>.<pid>`, then rename).

use std::fs;
use std::io;
use std::path::Path;

pub fn atomic_write(path: &Path, contents: &str) -> io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("file");
    let tmp = parent.join(format!(".tmp.{name}.{}", std::process::id()));
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
#[path = "fsutil_tests.rs"]
mod tests;
