//! Dashboard command.

use anyhow::{Context as _, Result};
use colored::Colorize;

use crate::context::Context;
use crate::output;

pub async fn run(ctx: &Context) -> Result<()> {
    ctx.require_session().await?;

    let summary = ctx
        .client
        .dashboard()
        .load()
        .await
        .context("Failed to load dashboard")?;

    if ctx.json {
        return output::json_pretty(&summary);
    }

    let counts = &summary.counts;
    output::field("Total", &counts.total.to_string());
    output::field("To do", &counts.todo.to_string());
    output::field("In progress", &counts.in_progress.to_string());
    output::field("Completed", &counts.completed.to_string());

    println!();
    if summary.recent.is_empty() {
        eprintln!("{}", "No tasks yet.".dimmed());
        return Ok(());
    }
    println!("{}", "Recent tasks".bold());
    for task in &summary.recent {
        output::task_line(task);
    }
    Ok(())
}
