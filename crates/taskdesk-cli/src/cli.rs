//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::auth::AuthCommand;
use crate::commands::projects::ProjectsCommand;
use crate::commands::tasks::TasksCommand;

/// Manage taskdesk tasks and projects from the terminal.
#[derive(Parser, Debug)]
#[command(name = "taskdesk")]
#[command(author, version = env!("TASKDESK_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// API base URL
    #[arg(long, global = true, env = "TASKDESK_API_URL")]
    pub api_url: Option<String>,

    /// Where the session tokens are kept
    #[arg(long, global = true, env = "TASKDESK_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in, sign out, and manage the account
    Auth(AuthCommand),

    /// Task operations
    Tasks(TasksCommand),

    /// Project operations
    Projects(ProjectsCommand),

    /// Task counts and the most recent tasks
    Dashboard,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn arguments_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "taskdesk",
            "tasks",
            "list",
            "--json",
            "--api-url",
            "http://localhost:9000",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:9000"));
    }
}
