// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_role_worktree_lines() {
    let text = "\
# Session

Some preamble.

## Role worktrees

- lead: /sessions/s1/worktrees/lead
- builder-a: /sessions/s1/worktrees/builder-a

## Other section

- not-a-role: ignored
";
    let parsed = parse_role_worktrees(text).expect("parse");
    assert_eq!(parsed.len(), 2);
    assert_eq!(
        parsed.get(&Role::new("lead")).expect("lead"),
        &PathBuf::from("/sessions/s1/worktrees/lead")
    );
    assert_eq!(
        parsed.get(&Role::new("builder-a")).expect("builder-a"),
        &PathBuf::from("/sessions/s1/worktrees/builder-a")
    );
    assert!(!parsed.contains_key(&Role::new("not-a-role")));
}

#[test]
fn missing_section_is_an_error() {
    let text = "# Session\n\nno worktrees section here\n";
    assert_eq!(parse_role_worktrees(text), Err(WorktreeParseError::SectionMissing));
}

#[test]
fn tolerates_blank_lines_within_section() {
    let text = "## Role worktrees\n\n- lead: /a\n\n- tester: /b\n";
    let parsed = parse_role_worktrees(text).expect("parse");
    assert_eq!(parsed.len(), 2);
}
