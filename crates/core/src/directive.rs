// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser for the `::bus-send{...}` directive grammar embedded in receipt
//! bodies (spec §4.5 step 4, §9 glossary "Directive").
//!
//! A role requests a follow-up message by emitting a line such as:
//!
//! ```text
//! ::bus-send{to="reviewer" intent="review" risk="low" message="please check the diff"}
//! ```
//!
//! `to` may name a single role, a comma-separated list (`to="r1,r2"`), or
//! the broadcast keyword `to="all"` (every role except the sender, filled
//! in by the router which knows the full role roster). Parsing is pure
//! and I/O-free; the router owns applying capability policy to the
//! result.

use regex::Regex;

/// One `to=` target: a specific role, or the broadcast marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Roles(Vec<String>),
    All,
}

/// A single parsed `::bus-send{...}` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub to: Target,
    pub intent: String,
    pub risk: Option<String>,
    pub message: String,
    pub accept: Option<String>,
}

fn directive_regex() -> Regex {
    // `unwrap` is justified only because the pattern is a compile-time
    // constant validated by the parser tests; never compiled per-call.
    #[allow(clippy::unwrap_used)]
    Regex::new(r#"::bus-send\{([^}]*)\}"#).unwrap()
}

fn kv_regex() -> Regex {
    #[allow(clippy::unwrap_used)]
    Regex::new(r#"(\w+)\s*=\s*"([^"]*)""#).unwrap()
}

/// Scan `text` for all `::bus-send{...}` directives, skipping any that
/// are missing the required `to`/`intent`/`message` fields.
pub fn parse_all(text: &str) -> Vec<Directive> {
    let outer = directive_regex();
    let inner = kv_regex();
    outer
        .captures_iter(text)
        .filter_map(|cap| {
            let body = cap.get(1)?.as_str();
            let mut to = None;
            let mut intent = None;
            let mut risk = None;
            let mut message = None;
            let mut accept = None;
            for kv in inner.captures_iter(body) {
                let key = kv.get(1)?.as_str();
                let val = kv.get(2)?.as_str().to_string();
                match key {
                    "to" => to = Some(parse_target(&val)),
                    "intent" => intent = Some(val),
                    "risk" => risk = Some(val),
                    "message" => message = Some(val),
                    "accept" => accept = Some(val),
                    _ => {}
                }
            }
            Some(Directive {
                to: to?,
                intent: intent?,
                risk,
                message: message?,
                accept,
            })
        })
        .collect()
}

fn parse_target(val: &str) -> Target {
    if val.trim() == "all" {
        Target::All
    } else {
        Target::Roles(val.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
    }
}

#[cfg(test)]
#[path = "directive_tests.rs"]
mod tests;
