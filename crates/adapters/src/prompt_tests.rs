// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn joins_all_nonempty_sections_with_blank_lines() {
    let prompt = assemble_prompt("role prompt", "memory tail", "task context", "message body");
    assert_eq!(prompt, "role prompt\n\nmemory tail\n\ntask context\n\nmessage body");
}

#[test]
fn omits_empty_sections() {
    let prompt = assemble_prompt("role prompt", "", "", "message body");
    assert_eq!(prompt, "role prompt\n\nmessage body");
}

#[test]
fn trims_each_section() {
    let prompt = assemble_prompt("  role prompt  \n", "\nmemory\n", "", "body");
    assert_eq!(prompt, "role prompt\n\nmemory\n\nbody");
}
