//! Task endpoints.

use tracing::{debug, instrument};

use taskdesk_core::{NewTask, Result, StatusCounts, Task, TaskFilter, TaskStatus, TaskUpdate};

use crate::http::PendingRequest;
use crate::http::endpoints::{self, TASK_STATUS_COUNTS, TASKS};
use crate::pipeline::AuthPipeline;

/// Task operations for the signed-in user.
#[derive(Debug, Clone, Copy)]
pub struct Tasks<'a> {
    pipeline: &'a AuthPipeline,
}

impl<'a> Tasks<'a> {
    pub(crate) fn new(pipeline: &'a AuthPipeline) -> Self {
        Self { pipeline }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        debug!("Listing tasks");
        let request = PendingRequest::get(TASKS).with_query(filter.to_query());
        self.pipeline.send(&request).await?.into_data()
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Task> {
        self.pipeline.get(&endpoints::task(id)).await?.into_data()
    }

    #[instrument(skip(self, task), fields(title = %task.title))]
    pub async fn create(&self, task: &NewTask) -> Result<Task> {
        task.validate()?;
        debug!("Creating task");
        self.pipeline.post(TASKS, task).await?.into_data()
    }

    #[instrument(skip(self, update))]
    pub async fn update(&self, id: i64, update: &TaskUpdate) -> Result<Task> {
        update.validate()?;
        debug!("Updating task");
        self.pipeline
            .put(&endpoints::task(id), update)
            .await?
            .into_data()
    }

    /// Move a task to another workflow state.
    pub async fn set_status(&self, id: i64, status: TaskStatus) -> Result<Task> {
        self.update(id, &TaskUpdate::status(status)).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        debug!("Deleting task");
        self.pipeline
            .delete::<serde_json::Value>(&endpoints::task(id))
            .await?;
        Ok(())
    }

    pub async fn status_counts(&self) -> Result<StatusCounts> {
        self.pipeline.get(TASK_STATUS_COUNTS).await?.into_data()
    }
}
