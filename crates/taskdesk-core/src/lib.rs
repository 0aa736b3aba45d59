//! taskdesk-core - Core types and traits for the taskdesk client.

pub mod credentials;
pub mod error;
pub mod resources;
pub mod tokens;
pub mod traits;
pub mod types;
pub mod validation;

pub use credentials::{Credentials, ProfileUpdate, Registration};
pub use error::Error;
pub use resources::{
    NewProject, NewTask, Project, ProjectUpdate, StatusCounts, Task, TaskFilter, TaskPriority,
    TaskStatus, TaskUpdate,
};
pub use tokens::{AccessToken, RefreshToken};
pub use traits::TokenStorage;
pub use types::{ApiUrl, UserIdentity};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
