// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The external code-generation tool invocation contract (spec §4.4,
//! `SPEC_FULL.md` §4.4): `<tool> -a never exec -s workspace-write
//! -m <model> --add-dir <session_root> --cd <role_cwd>
//! --output-last-message <path> -`, prompt piped on stdin.
//!
//! The tool is generic (`ExternalTool`), not hardcoded to one binary
//! name, so the worker loop is testable against a fake implementation.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Model used when no `AUTOPILOT_MODEL` override is configured.
pub const DEFAULT_MODEL: &str = "auto";

#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// Binary name, e.g. `AUTOPILOT_CODEGEN_BIN` (default `codex`).
    pub bin: String,
    pub model: String,
    pub session_root: PathBuf,
    pub role_cwd: PathBuf,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub rc: i32,
    pub last_message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("failed to spawn {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write prompt to {bin} stdin: {source}")]
    Stdin {
        bin: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to wait for {bin}: {source}")]
    Wait {
        bin: String,
        #[source]
        source: std::io::Error,
    },
    #[error("io error reading --output-last-message file at {path}: {source}")]
    OutputFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// An external code-generation tool. Implementations spawn a process,
/// a container, or (in tests) a scripted fake.
#[async_trait]
pub trait ExternalTool: Send + Sync {
    async fn invoke(&self, invocation: &ToolInvocation) -> Result<ToolOutcome, ToolError>;
}

/// Spawns the configured binary as a one-shot subprocess, mirroring
/// `autopilot.py::codex_exec`.
#[derive(Debug, Clone, Default)]
pub struct ProcessTool;

impl ProcessTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExternalTool for ProcessTool {
    async fn invoke(&self, invocation: &ToolInvocation) -> Result<ToolOutcome, ToolError> {
        let output_path = invocation
            .session_root
            .join("artifacts")
            .join("autopilot")
            .join(format!(".last-message.{}", std::process::id()));
        if let Some(parent) = output_path.parent() {
            let _ = tokio::fs::create_dir_all(parent).await;
        }

        let mut command = Command::new(&invocation.bin);
        command
            .arg("-a")
            .arg("never")
            .arg("exec")
            .arg("-s")
            .arg("workspace-write")
            .arg("-m")
            .arg(&invocation.model)
            .arg("--add-dir")
            .arg(&invocation.session_root)
            .arg("--cd")
            .arg(&invocation.role_cwd)
            .arg("--output-last-message")
            .arg(&output_path)
            .arg("-")
            .env_clear()
            .envs(crate::env::sanitized_env())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command
            .spawn()
            .map_err(|source| ToolError::Spawn { bin: invocation.bin.clone(), source })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(invocation.prompt.as_bytes())
                .await
                .map_err(|source| ToolError::Stdin { bin: invocation.bin.clone(), source })?;
        }

        let status = child
            .wait()
            .await
            .map_err(|source| ToolError::Wait { bin: invocation.bin.clone(), source })?;

        let last_message = read_last_message(&output_path).await?;
        let _ = tokio::fs::remove_file(&output_path).await;

        Ok(ToolOutcome { rc: status.code().unwrap_or(-1), last_message })
    }
}

async fn read_last_message(path: &Path) -> Result<String, ToolError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(source) => Err(ToolError::OutputFile { path: path.display().to_string(), source }),
    }
}

/// A scripted [`ExternalTool`] for exercising the Worker Loop without a
/// real subprocess. Records every invocation it receives.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct FakeTool {
    pub outcomes: parking_lot::Mutex<std::collections::VecDeque<Result<ToolOutcome, String>>>,
    pub invocations: parking_lot::Mutex<Vec<ToolInvocation>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome returned by the next `invoke` call, in order.
    pub fn push_ok(&self, rc: i32, last_message: impl Into<String>) {
        self.outcomes.lock().push_back(Ok(ToolOutcome { rc, last_message: last_message.into() }));
    }

    pub fn push_err(&self, message: impl Into<String>) {
        self.outcomes.lock().push_back(Err(message.into()));
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().len()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl ExternalTool for FakeTool {
    async fn invoke(&self, invocation: &ToolInvocation) -> Result<ToolOutcome, ToolError> {
        self.invocations.lock().push(invocation.clone());
        match self.outcomes.lock().pop_front() {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(message)) => Err(ToolError::Spawn {
                bin: invocation.bin.clone(),
                source: std::io::Error::other(message),
            }),
            None => Ok(ToolOutcome { rc: 0, last_message: String::new() }),
        }
    }
}

#[cfg(test)]
#[path = "tool_tests.rs"]
mod tests;
