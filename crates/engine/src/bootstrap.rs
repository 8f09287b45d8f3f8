// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Lead-only bootstrap short-circuit (spec §4.4): an `intent=bootstrap`
//! message to `lead` parses `shared/task.md` and creates the initial
//! implement/review/test tasks, once per source message.
//!
//! Format ported from `team.py::write_task`: `# Task\n<objective>\n\n##
//! Acceptance\n- <item>\n...`.

use taskbus_core::{Clock, Intent, Message, Risk, Role, Task};
use taskbus_storage::{add_task, list_tasks, Config, SessionPaths};

use crate::error::WorkerError;

/// Parse `shared/task.md` text into (objective, acceptance bullets).
pub fn parse_task_md(text: &str) -> (String, Vec<String>) {
    let mut objective_lines = Vec::new();
    let mut acceptance = Vec::new();
    let mut in_acceptance = false;
    let mut past_heading = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed == "# Task" {
            past_heading = true;
            continue;
        }
        if trimmed == "## Acceptance" {
            in_acceptance = true;
            continue;
        }
        if in_acceptance {
            if let Some(item) = trimmed.strip_prefix("- ") {
                acceptance.push(item.trim().to_string());
            } else if let Some(item) = trimmed.strip_prefix("-") {
                let item = item.trim();
                if !item.is_empty() {
                    acceptance.push(item.to_string());
                }
            }
        } else if past_heading {
            objective_lines.push(line);
        }
    }

    let objective = objective_lines.join("\n").trim().to_string();
    (objective, acceptance)
}

/// Pick the first discovered role whose name starts with `"builder"`,
/// in [`taskbus_core::ROLE_ORDER`] order, falling back to any discovered
/// role named `"builder"`.
fn first_builder(paths: &SessionPaths) -> Option<Role> {
    let roles = taskbus_core::sort_roles(paths.discover_roles().unwrap_or_default());
    roles.into_iter().find(|r| r.as_str().starts_with("builder"))
}

fn role_named(paths: &SessionPaths, name: &str) -> Option<Role> {
    paths
        .discover_roles()
        .unwrap_or_default()
        .into_iter()
        .find(|r| r.as_str() == name)
}

/// Whether a task board already has a task referencing `source_message_id`.
fn already_bootstrapped(paths: &SessionPaths, clock: &impl Clock, source_message_id: &str) -> bool {
    list_tasks(paths, clock)
        .iter()
        .any(|t| t.source_message_id.as_ref().map(|m| m.as_str()) == Some(source_message_id))
}

/// Run the bootstrap short-circuit for `message` if applicable: `to=lead`,
/// `intent=bootstrap`, and not already run for this message id. Returns
/// the newly created tasks (empty if the message doesn't trigger
/// bootstrap, or if it already ran).
pub fn maybe_bootstrap(
    paths: &SessionPaths,
    cfg: &Config,
    clock: &impl Clock,
    message: &Message,
) -> Result<Vec<Task>, WorkerError> {
    if !message.to.is_lead() || message.intent != Intent::Bootstrap {
        return Ok(Vec::new());
    }
    let source_message_id = message.id.as_str().to_string();
    if already_bootstrapped(paths, clock, &source_message_id) {
        return Ok(Vec::new());
    }

    let task_md_path = paths.shared_task_md();
    let text = std::fs::read_to_string(&task_md_path).map_err(|source| WorkerError::Io {
        path: task_md_path.display().to_string(),
        source,
    })?;
    let (objective, acceptance) = parse_task_md(&text);
    let title = if objective.is_empty() { "Untitled task".to_string() } else { objective };

    let builder = first_builder(paths);
    let reviewer = role_named(paths, "reviewer");
    let tester = role_named(paths, "tester");

    let implement = add_task(
        paths,
        cfg,
        clock,
        &title,
        builder.as_ref(),
        "implement",
        Risk::Medium,
        acceptance.clone(),
        Vec::new(),
        Intent::Implement,
        message.from.as_str(),
        Some(source_message_id.clone()),
    )?;

    let review = add_task(
        paths,
        cfg,
        clock,
        &format!("Review: {title}"),
        reviewer.as_ref(),
        "review",
        Risk::Medium,
        acceptance.clone(),
        vec![implement.id],
        Intent::Review,
        message.from.as_str(),
        Some(source_message_id.clone()),
    )?;

    let test = add_task(
        paths,
        cfg,
        clock,
        &format!("Test: {title}"),
        tester.as_ref(),
        "test",
        Risk::Medium,
        acceptance,
        vec![implement.id],
        Intent::Test,
        message.from.as_str(),
        Some(source_message_id),
    )?;

    Ok(vec![implement, review, test])
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
