// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal frontmatter envelope grammar shared by messages and receipts.
//!
//! Grammar (spec §4.2), ported from `router.py`/`autopilot.py`'s
//! `parse_frontmatter` (the two scripts carried identical copies):
//!
//! ```text
//! ---
//! key: value
//! listkey:
//!   - "item one"
//!   - "item two"
//! ---
//!
//! <body, preserved verbatim>
//! ```
//!
//! Scalars may be double-quoted (quotes stripped on parse, added on
//! emit). A key followed by `  - "item"` lines accumulates a list; a
//! non-list key interleaved between list lines ends the list. Files
//! whose first non-empty line is not `---` parse to an empty header
//! with the whole input as body.

use indexmap::IndexMap;
use std::fmt;

/// One frontmatter value: a scalar string or an ordered list of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Scalar(String),
    List(Vec<String>),
}

impl Value {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            Self::Scalar(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// Parsed frontmatter header: an ordered key → value map.
///
/// Ordered so that `emit` round-trips key order for headers it produced
/// itself, matching the spec §8 round-trip property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter(IndexMap<String, Value>);

impl Frontmatter {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_scalar(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_scalar)
    }

    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).and_then(Value::as_list)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

fn strip_quotes(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

/// Parse a frontmatter envelope, returning (header, body).
///
/// Matches `router.py::parse_frontmatter` exactly: if the document has
/// fewer than 3 lines or the first line isn't `---`, returns an empty
/// header and the entire input as body.
pub fn parse(text: &str) -> (Frontmatter, String) {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 3 || lines[0].trim() != "---" {
        return (Frontmatter::new(), text.to_string());
    }

    let mut fm = Frontmatter::new();
    let mut current_key: Option<String> = None;
    let mut i = 1;
    while i < lines.len() {
        let line = lines[i];
        if line.trim() == "---" {
            let body = lines[i + 1..].join("\n");
            let body = body.trim_start_matches('\n').to_string();
            return (fm, body);
        }

        if let Some(rest) = line.strip_prefix("  - ") {
            if let Some(key) = &current_key {
                let val = strip_quotes(rest);
                match fm.0.get_mut(key) {
                    Some(Value::List(items)) => items.push(val),
                    _ => {
                        fm.0.insert(key.clone(), Value::List(vec![val]));
                    }
                }
                i += 1;
                continue;
            }
        }

        if let Some((key, val)) = split_key_value(line) {
            current_key = Some(key.clone());
            fm.0.insert(key, Value::Scalar(strip_quotes(&val)));
        }
        i += 1;
    }

    // No closing delimiter found: treat as malformed, same as too-short input.
    (Frontmatter::new(), text.to_string())
}

fn split_key_value(line: &str) -> Option<(String, String)> {
    let colon = line.find(':')?;
    let key = &line[..colon];
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return None;
    }
    let val = line[colon + 1..].trim().to_string();
    Some((key.to_string(), val))
}

/// Emit a frontmatter envelope from a header and body, the mirror of [`parse`].
pub fn emit(fm: &Frontmatter, body: &str) -> String {
    let mut out = String::from("---\n");
    for (key, value) in fm.iter() {
        match value {
            Value::Scalar(s) => {
                out.push_str(key);
                out.push_str(": ");
                out.push_str(s);
                out.push('\n');
            }
            Value::List(items) => {
                out.push_str(key);
                out.push_str(":\n");
                for item in items {
                    out.push_str("  - \"");
                    out.push_str(item);
                    out.push_str("\"\n");
                }
            }
        }
    }
    out.push_str("---\n\n");
    out.push_str(body.trim_end_matches('\n'));
    out.push('\n');
    out
}

impl fmt::Display for Frontmatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", emit(self, ""))
    }
}

#[cfg(test)]
#[path = "frontmatter_tests.rs"]
mod tests;
