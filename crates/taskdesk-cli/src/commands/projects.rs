//! Project commands.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use taskdesk_core::{NewProject, Project, ProjectUpdate};

use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct ProjectsCommand {
    #[command(subcommand)]
    pub command: ProjectsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectsSubcommand {
    /// List projects with their task counts
    List,

    /// Show one project
    Get { id: i64 },

    /// Create a project
    Create {
        name: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// Rename or redescribe a project
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a project
    Delete { id: i64 },
}

fn show(ctx: &Context, project: &Project, message: Option<&str>) -> Result<()> {
    if ctx.json {
        return output::json_pretty(project);
    }
    if let Some(message) = message {
        output::success(message);
        println!();
    }
    output::project_detail(project);
    Ok(())
}

pub async fn handle(ctx: &Context, cmd: ProjectsCommand) -> Result<()> {
    ctx.require_session().await?;
    let projects = ctx.client.projects();

    match cmd.command {
        ProjectsSubcommand::List => {
            let list = projects.list().await.context("Failed to list projects")?;
            if ctx.json {
                return output::json_pretty(&list);
            }
            if list.is_empty() {
                eprintln!("{}", "No projects found.".dimmed());
            }
            for project in &list {
                output::project_line(project);
            }
            Ok(())
        }
        ProjectsSubcommand::Get { id } => {
            let project = projects.get(id).await.context("Failed to fetch project")?;
            show(ctx, &project, None)
        }
        ProjectsSubcommand::Create { name, description } => {
            let mut project = NewProject::new(name);
            project.description = description;
            let project = projects
                .create(&project)
                .await
                .context("Failed to create project")?;
            show(ctx, &project, Some("Project created"))
        }
        ProjectsSubcommand::Update {
            id,
            name,
            description,
        } => {
            let update = ProjectUpdate { name, description };
            let project = projects
                .update(id, &update)
                .await
                .context("Failed to update project")?;
            show(ctx, &project, Some("Project updated"))
        }
        ProjectsSubcommand::Delete { id } => {
            projects.delete(id).await.context("Failed to delete project")?;
            if !ctx.json {
                output::success(&format!("Deleted project #{id}"));
            }
            Ok(())
        }
    }
}
