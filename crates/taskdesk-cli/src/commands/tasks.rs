//! Task commands.

use anyhow::{Context as _, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Subcommand};
use colored::Colorize;

use taskdesk_core::{NewTask, TaskFilter, TaskPriority, TaskStatus, TaskUpdate};

use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct TasksCommand {
    #[command(subcommand)]
    pub command: TasksSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TasksSubcommand {
    /// List tasks, optionally filtered
    List(ListArgs),

    /// Show one task
    Get { id: i64 },

    /// Create a task
    Create(CreateArgs),

    /// Change fields of a task
    Update(UpdateArgs),

    /// Move a task to another status
    Status { id: i64, status: TaskStatus },

    /// Delete a task
    Delete { id: i64 },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// todo, in-progress, or completed
    #[arg(long)]
    pub status: Option<TaskStatus>,

    /// low, medium, or high
    #[arg(long)]
    pub priority: Option<TaskPriority>,

    #[arg(long)]
    pub project: Option<i64>,

    /// Only tasks due on or before this date
    #[arg(long, value_parser = parse_due)]
    pub due_before: Option<NaiveDateTime>,

    /// Match against title and description
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    pub title: String,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, default_value = "medium")]
    pub priority: TaskPriority,

    #[arg(long, default_value = "todo")]
    pub status: TaskStatus,

    #[arg(long)]
    pub project: Option<i64>,

    /// YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS
    #[arg(long, value_parser = parse_due)]
    pub due: Option<NaiveDateTime>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub id: i64,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub priority: Option<TaskPriority>,

    #[arg(long)]
    pub status: Option<TaskStatus>,

    #[arg(long, conflicts_with = "no_project")]
    pub project: Option<i64>,

    /// Detach the task from its project
    #[arg(long)]
    pub no_project: bool,

    #[arg(long, value_parser = parse_due, conflicts_with = "no_due")]
    pub due: Option<NaiveDateTime>,

    /// Remove the due date
    #[arg(long)]
    pub no_due: bool,
}

/// Accept a bare date (midnight) or a full timestamp.
fn parse_due(value: &str) -> Result<NaiveDateTime, String> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default());
    }
    value
        .parse::<NaiveDateTime>()
        .map_err(|_| format!("expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, got '{value}'"))
}

fn clearable<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear { Some(None) } else { value.map(Some) }
}

pub async fn handle(ctx: &Context, cmd: TasksCommand) -> Result<()> {
    ctx.require_session().await?;

    match cmd.command {
        TasksSubcommand::List(args) => list(ctx, args).await,
        TasksSubcommand::Get { id } => get(ctx, id).await,
        TasksSubcommand::Create(args) => create(ctx, args).await,
        TasksSubcommand::Update(args) => update(ctx, args).await,
        TasksSubcommand::Status { id, status } => {
            let task = ctx
                .client
                .tasks()
                .set_status(id, status)
                .await
                .context("Failed to change task status")?;
            show(ctx, &task, "Status changed")
        }
        TasksSubcommand::Delete { id } => {
            ctx.client
                .tasks()
                .delete(id)
                .await
                .context("Failed to delete task")?;
            if !ctx.json {
                output::success(&format!("Deleted task #{id}"));
            }
            Ok(())
        }
    }
}

fn show(ctx: &Context, task: &taskdesk_core::Task, message: &str) -> Result<()> {
    if ctx.json {
        return output::json_pretty(task);
    }
    output::success(message);
    println!();
    output::task_detail(task);
    Ok(())
}

async fn list(ctx: &Context, args: ListArgs) -> Result<()> {
    let filter = TaskFilter {
        status: args.status,
        priority: args.priority,
        project_id: args.project,
        due_before: args.due_before,
        search: args.search,
        limit: args.limit,
    };

    let tasks = ctx
        .client
        .tasks()
        .list(&filter)
        .await
        .context("Failed to list tasks")?;

    if ctx.json {
        return output::json_pretty(&tasks);
    }
    if tasks.is_empty() {
        eprintln!("{}", "No tasks found.".dimmed());
        return Ok(());
    }
    for task in &tasks {
        output::task_line(task);
    }
    Ok(())
}

async fn get(ctx: &Context, id: i64) -> Result<()> {
    let task = ctx
        .client
        .tasks()
        .get(id)
        .await
        .context("Failed to fetch task")?;

    if ctx.json {
        return output::json_pretty(&task);
    }
    output::task_detail(&task);
    Ok(())
}

async fn create(ctx: &Context, args: CreateArgs) -> Result<()> {
    let mut task = NewTask::new(args.title);
    task.description = args.description;
    task.priority = args.priority;
    task.status = args.status;
    task.project_id = args.project;
    task.due_date = args.due;

    let task = ctx
        .client
        .tasks()
        .create(&task)
        .await
        .context("Failed to create task")?;
    show(ctx, &task, "Task created")
}

async fn update(ctx: &Context, args: UpdateArgs) -> Result<()> {
    let update = TaskUpdate {
        title: args.title,
        description: args.description,
        due_date: clearable(args.due, args.no_due),
        priority: args.priority,
        status: args.status,
        project_id: clearable(args.project, args.no_project),
    };

    let task = ctx
        .client
        .tasks()
        .update(args.id, &update)
        .await
        .context("Failed to update task")?;
    show(ctx, &task, "Task updated")
}
