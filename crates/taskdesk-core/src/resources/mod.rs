//! Task and project resource types.

mod project;
mod task;

pub use project::{NewProject, Project, ProjectUpdate};
pub use task::{NewTask, StatusCounts, Task, TaskFilter, TaskPriority, TaskStatus, TaskUpdate};
