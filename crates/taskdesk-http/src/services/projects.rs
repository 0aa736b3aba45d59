//! Project endpoints.

use tracing::{debug, instrument};

use taskdesk_core::{NewProject, Project, ProjectUpdate, Result};

use crate::http::endpoints::{self, PROJECTS};
use crate::pipeline::AuthPipeline;

/// Project operations for the signed-in user.
#[derive(Debug, Clone, Copy)]
pub struct Projects<'a> {
    pipeline: &'a AuthPipeline,
}

impl<'a> Projects<'a> {
    pub(crate) fn new(pipeline: &'a AuthPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn list(&self) -> Result<Vec<Project>> {
        self.pipeline.get(PROJECTS).await?.into_data()
    }

    pub async fn get(&self, id: i64) -> Result<Project> {
        self.pipeline.get(&endpoints::project(id)).await?.into_data()
    }

    #[instrument(skip(self, project), fields(name = %project.name))]
    pub async fn create(&self, project: &NewProject) -> Result<Project> {
        project.validate()?;
        debug!("Creating project");
        self.pipeline.post(PROJECTS, project).await?.into_data()
    }

    #[instrument(skip(self, update))]
    pub async fn update(&self, id: i64, update: &ProjectUpdate) -> Result<Project> {
        update.validate()?;
        self.pipeline
            .put(&endpoints::project(id), update)
            .await?
            .into_data()
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        debug!("Deleting project");
        self.pipeline
            .delete::<serde_json::Value>(&endpoints::project(id))
            .await?;
        Ok(())
    }
}
