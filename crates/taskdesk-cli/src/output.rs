//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use taskdesk_core::{Project, Task, TaskPriority, TaskStatus};

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

fn status_label(status: TaskStatus) -> String {
    match status {
        TaskStatus::Todo => status.as_str().normal().to_string(),
        TaskStatus::InProgress => status.as_str().yellow().to_string(),
        TaskStatus::Completed => status.as_str().green().to_string(),
    }
}

fn priority_label(priority: TaskPriority) -> String {
    match priority {
        TaskPriority::Low => priority.as_str().dimmed().to_string(),
        TaskPriority::Medium => priority.as_str().normal().to_string(),
        TaskPriority::High => priority.as_str().red().to_string(),
    }
}

/// One line per task: id, status, priority, title, due date.
pub fn task_line(task: &Task) {
    let due = task
        .due_date
        .map(|due| format!(" (due {})", due.format("%Y-%m-%d")))
        .unwrap_or_default();
    println!(
        "{:>5}  {:<11}  {:<6}  {}{}",
        format!("#{}", task.id).dimmed(),
        status_label(task.status),
        priority_label(task.priority),
        task.title,
        due.dimmed()
    );
}

/// Every field of a task.
pub fn task_detail(task: &Task) {
    field("ID", &task.id.to_string());
    field("Title", &task.title);
    field("Status", &status_label(task.status));
    field("Priority", &priority_label(task.priority));
    if let Some(ref description) = task.description {
        field("Description", description);
    }
    if let Some(due) = task.due_date {
        field("Due", &due.format("%Y-%m-%d %H:%M").to_string());
    }
    if let Some(project_id) = task.project_id {
        field("Project", &project_id.to_string());
    }
}

pub fn project_line(project: &Project) {
    println!(
        "{:>5}  {}  {}",
        format!("#{}", project.id).dimmed(),
        project.name,
        format!("({} tasks)", project.task_count).dimmed()
    );
}

pub fn project_detail(project: &Project) {
    field("ID", &project.id.to_string());
    field("Name", &project.name);
    if let Some(ref description) = project.description {
        field("Description", description);
    }
    field("Tasks", &project.task_count.to_string());
}
