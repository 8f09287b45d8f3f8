// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Closed-ish `Intent` and `Risk` enums shared by messages, receipts, and
//! the router's directive/capability policy (spec §4.5, §6).

use std::fmt;
use std::str::FromStr;

/// The purpose of a message or receipt, per spec §6's envelope grammar.
///
/// `Other(String)` absorbs any value not in the documented set so that
/// parsing never fails on forward-compatible or malformed input — the
/// router's capability policy then rejects `Other` intents from non-lead
/// roles rather than the codec rejecting the whole envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Intent {
    Implement,
    Review,
    Test,
    Fix,
    Question,
    Info,
    Alert,
    Bootstrap,
    Receipt,
    Other(String),
}

impl Intent {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Implement => "implement",
            Self::Review => "review",
            Self::Test => "test",
            Self::Fix => "fix",
            Self::Question => "question",
            Self::Info => "info",
            Self::Alert => "alert",
            Self::Bootstrap => "bootstrap",
            Self::Receipt => "receipt",
            Self::Other(s) => s,
        }
    }

    /// Intents any non-lead role is permitted to emit (spec §4.5 step 5).
    pub const NON_LEAD_ALLOWED: &'static [&'static str] =
        &["question", "review", "test", "fix", "info", "alert"];

    /// Whether `role` (not lead) may emit this intent via a directive.
    pub fn allowed_for_non_lead(&self) -> bool {
        Self::NON_LEAD_ALLOWED.contains(&self.as_str())
    }
}

impl FromStr for Intent {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "implement" => Self::Implement,
            "review" => Self::Review,
            "test" => Self::Test,
            "fix" => Self::Fix,
            "question" => Self::Question,
            "info" => Self::Info,
            "alert" => Self::Alert,
            "bootstrap" => Self::Bootstrap,
            "receipt" => Self::Receipt,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for Intent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Intent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        // Infallible: unknown strings land in `Other`.
        Ok(Intent::from_str(s).unwrap_or(Intent::Other(s.to_string())))
    }
}

/// Risk level attached to a message, per spec §3/§6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Risk {
    Low,
    #[default]
    Medium,
    High,
}

crate::simple_display! {
    Risk {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

impl FromStr for Risk {
    type Err = InvalidRisk;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(InvalidRisk(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid risk level: {0:?}")]
pub struct InvalidRisk(pub String);

impl serde::Serialize for Risk {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Risk {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        Risk::from_str(s).map_err(serde::de::Error::custom)
    }
}

/// Outbound status of a receipt, per spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceiptStatus {
    Done,
    Retry,
    Deadletter,
    Warn,
}

crate::simple_display! {
    ReceiptStatus {
        Done => "done",
        Retry => "retry",
        Deadletter => "deadletter",
        Warn => "warn",
    }
}

impl FromStr for ReceiptStatus {
    type Err = InvalidReceiptStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "done" => Ok(Self::Done),
            "retry" => Ok(Self::Retry),
            "deadletter" => Ok(Self::Deadletter),
            "warn" => Ok(Self::Warn),
            other => Err(InvalidReceiptStatus(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid receipt status: {0:?}")]
pub struct InvalidReceiptStatus(pub String);

#[cfg(test)]
#[path = "intent_tests.rs"]
mod tests;
