//! Typed services over the authenticated pipeline.

mod dashboard;
mod projects;
mod tasks;

pub use dashboard::{Dashboard, DashboardSummary, RECENT_TASKS};
pub use projects::Projects;
pub use tasks::Tasks;
