//! Dashboard aggregate.

use serde::Serialize;

use taskdesk_core::{Result, StatusCounts, Task, TaskFilter};

use super::Tasks;

/// Number of recent tasks shown on the dashboard.
pub const RECENT_TASKS: u32 = 5;

/// Counts per status plus the most recent tasks.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub counts: StatusCounts,
    pub recent: Vec<Task>,
}

/// Loads the dashboard.
#[derive(Debug, Clone, Copy)]
pub struct Dashboard<'a> {
    tasks: Tasks<'a>,
}

impl<'a> Dashboard<'a> {
    pub(crate) fn new(tasks: Tasks<'a>) -> Self {
        Self { tasks }
    }

    /// Fetch counts and recent tasks concurrently. Either failing fails the
    /// whole load. The server may ignore `limit`, so the list is cut to
    /// [`RECENT_TASKS`] here as well.
    pub async fn load(&self) -> Result<DashboardSummary> {
        let filter = TaskFilter {
            limit: Some(RECENT_TASKS),
            ..TaskFilter::default()
        };

        let (counts, mut recent) =
            futures_util::try_join!(self.tasks.status_counts(), self.tasks.list(&filter))?;
        recent.truncate(RECENT_TASKS as usize);

        Ok(DashboardSummary { counts, recent })
    }
}
