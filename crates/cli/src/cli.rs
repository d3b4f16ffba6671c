use std::path::PathBuf;

use clap::{Parser, Subcommand};

use approvals::ApprovalId;

#[derive(Parser)]
#[command(
    name = "release-gate",
    version,
    about = "Human approval gate for release operations"
)]
pub struct Cli {
    /// Approval snapshot to use (overrides RELEASE_GATE_STORE_PATH)
    #[arg(long, global = true)]
    pub store_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List approval requests, soonest-expiring first
    List {
        /// Print the records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one approval request
    Get { id: ApprovalId },
    /// Approve a pending request
    Approve { id: ApprovalId },
    /// Reject a pending request
    Reject { id: ApprovalId },
    /// Delete a request (a waiting caller treats this as a rejection)
    Delete { id: ApprovalId },
    /// Delete requests whose approval window has already ended
    Prune,
    /// Run a command only after an operator approves it
    Exec {
        /// Operation name shown to approvers (e.g. "push_tag")
        #[arg(long)]
        name: String,

        /// The command to run, after `--`
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
}
