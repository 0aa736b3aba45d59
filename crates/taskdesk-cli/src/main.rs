//! taskdesk - command line client for the taskdesk API.
//!
//! A thin wrapper over `taskdesk-http`: every command restores the saved
//! session, runs, and reports if the server forced a new login.

mod cli;
mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{auth, dashboard, projects, tasks};
use context::Context;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let restore = !matches!(&cli.command, Commands::Auth(cmd) if !cmd.needs_session());
    let mut ctx = Context::open(&cli, restore).await?;

    let outcome = match cli.command {
        Commands::Auth(cmd) => auth::handle(&ctx, cmd).await,
        Commands::Tasks(cmd) => tasks::handle(&ctx, cmd).await,
        Commands::Projects(cmd) => projects::handle(&ctx, cmd).await,
        Commands::Dashboard => dashboard::run(&ctx).await,
    };

    ctx.report_login_required();
    outcome
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
