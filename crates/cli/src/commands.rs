//! Handlers for the operator commands.

use std::process::ExitStatus;

use anyhow::Context;
use tokio::process::Command;
use tracing::info;

use approvals::{ApprovalId, ApprovalRecord, CallArguments, OperationName, Timestamp};
use gate::{ApprovalGate, ApprovalService};

const ARGS_COLUMN: usize = 40;

pub async fn list(service: &ApprovalService, json: bool) -> anyhow::Result<()> {
    let records = service.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No approval requests.");
        return Ok(());
    }

    println!(
        "{:<38} {:<28} {:<9} {:<26} ARGS",
        "ID", "OPERATION", "STATUS", "EXPIRES"
    );
    for r in records {
        println!(
            "{:<38} {:<28} {:<9} {:<26} {}",
            r.id().to_string(),
            r.operation_name().to_string(),
            r.status().to_string(),
            r.expires_at().to_string(),
            truncate(&serde_json::to_string(r.arguments())?, ARGS_COLUMN)
        );
    }
    Ok(())
}

pub async fn get(service: &ApprovalService, id: ApprovalId) -> anyhow::Result<()> {
    let record = service.get(id).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

pub async fn approve(service: &ApprovalService, id: ApprovalId) -> anyhow::Result<()> {
    let record = service.approve(id).await?;
    println!("{}", decided(&record));
    Ok(())
}

pub async fn reject(service: &ApprovalService, id: ApprovalId) -> anyhow::Result<()> {
    let record = service.reject(id).await?;
    println!("{}", decided(&record));
    Ok(())
}

pub async fn delete(service: &ApprovalService, id: ApprovalId) -> anyhow::Result<()> {
    service.delete(id).await?;
    println!("Request {id} deleted.");
    Ok(())
}

pub async fn prune(service: &ApprovalService) -> anyhow::Result<()> {
    let removed = service.prune_expired(Timestamp::now()).await?;
    println!("Pruned {removed} expired request(s).");
    Ok(())
}

/// Runs `command` behind the gate and returns its exit status.
///
/// The program and its arguments are recorded as positional arguments and the
/// working directory as the named argument `cwd`, so approvers see exactly what
/// will run and where.
pub async fn exec(
    gate: &ApprovalGate,
    name: &str,
    command: Vec<String>,
) -> anyhow::Result<ExitStatus> {
    let operation = OperationName::new(name).context("operation name must not be empty")?;
    let cwd = std::env::current_dir().context("failed to read the working directory")?;

    let args = command
        .into_iter()
        .fold(CallArguments::new(), CallArguments::with_positional)
        .with_named("cwd", cwd.display().to_string());

    gate.run(&operation, args, |args| async move {
        let argv: Vec<String> = args
            .positional
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        let (program, rest) = argv.split_first().context("no command to run")?;

        info!(program = %program, "running approved command");
        Command::new(program)
            .args(rest)
            .current_dir(&cwd)
            .status()
            .await
            .with_context(|| format!("failed to start '{program}'"))
    })
    .await
}

fn decided(record: &ApprovalRecord) -> String {
    format!(
        "Request {} ({}) {}.",
        record.id(),
        record.operation_name(),
        record.status()
    )
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("{}", 10), "{}");
    }

    #[test]
    fn truncate_is_char_safe() {
        let text = "é".repeat(50);
        let out = truncate(&text, 10);
        assert_eq!(out.chars().count(), 10);
        assert!(out.ends_with("..."));
    }
}
