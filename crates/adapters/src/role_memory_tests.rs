// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn trim_bound_doubles_prompt_lines() {
    assert_eq!(trim_bound(40), 80);
    assert_eq!(trim_bound(50), 100);
}

#[test]
fn trim_bound_clamps_to_minimum_eighty() {
    assert_eq!(trim_bound(1), 80);
    assert_eq!(trim_bound(0), 80);
}

#[test]
fn tail_returns_last_n_lines() {
    let text = "a\nb\nc\nd\ne";
    assert_eq!(tail(text, 2), "d\ne");
    assert_eq!(tail(text, 100), "a\nb\nc\nd\ne");
}

#[test]
fn append_record_grows_when_under_budget() {
    let existing = "line one";
    let result = append_record(existing, "line two", 1024);
    assert_eq!(result, "line one\nline two");
}

#[test]
fn append_record_drops_oldest_whole_lines_over_budget() {
    let existing = "first record here\nsecond record here";
    let result = append_record(existing, "third record here", 40);
    assert!(result.len() <= 40);
    assert!(result.ends_with("third record here"));
    assert!(!result.contains("first record"));
}

#[test]
fn append_record_to_empty_memory_is_just_the_record() {
    assert_eq!(append_record("", "only record", 1024), "only record");
}
