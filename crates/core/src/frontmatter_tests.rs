// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn parses_scalar_fields() {
    let text = "---\nid: m1\nfrom: lead\nto: builder-a\n---\n\nhello\n";
    let (fm, body) = parse(text);
    assert_eq!(fm.get_scalar("id"), Some("m1"));
    assert_eq!(fm.get_scalar("from"), Some("lead"));
    assert_eq!(fm.get_scalar("to"), Some("builder-a"));
    assert_eq!(body, "hello\n");
}

#[test]
fn strips_double_quotes_from_scalars() {
    let text = "---\nid: \"m1\"\n---\n\nbody\n";
    let (fm, _) = parse(text);
    assert_eq!(fm.get_scalar("id"), Some("m1"));
}

#[test]
fn parses_list_continuation() {
    let text = "---\nacceptance:\n  - \"line 1\"\n  - \"line 2\"\n---\n\nbody\n";
    let (fm, _) = parse(text);
    assert_eq!(fm.get_list("acceptance"), Some(&["line 1".to_string(), "line 2".to_string()][..]));
}

#[test]
fn interleaved_key_ends_list() {
    let text = "---\nacceptance:\n  - \"a\"\nrisk: low\n---\n\nbody\n";
    let (fm, _) = parse(text);
    assert_eq!(fm.get_list("acceptance"), Some(&["a".to_string()][..]));
    assert_eq!(fm.get_scalar("risk"), Some("low"));
}

#[test]
fn rejects_missing_opening_delimiter() {
    let text = "id: m1\nbody text here\nmore\n";
    let (fm, body) = parse(text);
    assert!(fm.is_empty());
    assert_eq!(body, text);
}

#[test]
fn too_short_input_is_raw_body() {
    let text = "---\nid: m1";
    let (fm, body) = parse(text);
    assert!(fm.is_empty());
    assert_eq!(body, text);
}

#[test]
fn preserves_body_bytes_verbatim() {
    let text = "---\nid: m1\n---\n\nline one\nline two\n";
    let (_, body) = parse(text);
    assert_eq!(body, "line one\nline two\n");
}

#[parameterized(
    scalar_only = { {
        let mut fm = Frontmatter::new();
        fm.set("id", "m1").set("from", "lead").set("to", "builder-a");
        fm
    }, "hello world" },
    with_list = { {
        let mut fm = Frontmatter::new();
        fm.set("id", "m2").set("acceptance", vec!["a".to_string(), "b".to_string()]);
        fm
    }, "body text" },
)]
fn round_trips_through_emit_then_parse(fm: Frontmatter, body: &str) {
    let emitted = emit(&fm, body);
    let (parsed_fm, parsed_body) = parse(&emitted);
    assert_eq!(parsed_fm, fm);
    assert_eq!(parsed_body, format!("{}\n", body));
}
