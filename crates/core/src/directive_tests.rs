// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_single_target_directive() {
    let text = r#"Some receipt prose.
::bus-send{to="reviewer" intent="review" risk="low" message="please check the diff"}
"#;
    let directives = parse_all(text);
    assert_eq!(directives.len(), 1);
    let d = &directives[0];
    assert_eq!(d.to, Target::Roles(vec!["reviewer".to_string()]));
    assert_eq!(d.intent, "review");
    assert_eq!(d.risk.as_deref(), Some("low"));
    assert_eq!(d.message, "please check the diff");
    assert_eq!(d.accept, None);
}

#[test]
fn parses_comma_separated_targets() {
    let text = r#"::bus-send{to="builder-a,builder-b" intent="info" message="heads up"}"#;
    let directives = parse_all(text);
    assert_eq!(
        directives[0].to,
        Target::Roles(vec!["builder-a".to_string(), "builder-b".to_string()])
    );
}

#[test]
fn parses_broadcast_target() {
    let text = r#"::bus-send{to="all" intent="alert" message="ci is red"}"#;
    let directives = parse_all(text);
    assert_eq!(directives[0].to, Target::All);
}

#[test]
fn parses_optional_accept_field() {
    let text = r#"::bus-send{to="tester" intent="test" message="run the suite" accept="all green"}"#;
    let directives = parse_all(text);
    assert_eq!(directives[0].accept.as_deref(), Some("all green"));
}

#[test]
fn skips_directive_missing_required_field() {
    let text = r#"::bus-send{to="reviewer" risk="low"}"#;
    assert!(parse_all(text).is_empty());
}

#[test]
fn parses_multiple_directives_in_one_body() {
    let text = r#"
::bus-send{to="reviewer" intent="review" message="first"}
some text in between
::bus-send{to="tester" intent="test" message="second"}
"#;
    let directives = parse_all(text);
    assert_eq!(directives.len(), 2);
    assert_eq!(directives[0].message, "first");
    assert_eq!(directives[1].message, "second");
}

#[test]
fn text_with_no_directives_returns_empty() {
    assert!(parse_all("just plain receipt body").is_empty());
}
