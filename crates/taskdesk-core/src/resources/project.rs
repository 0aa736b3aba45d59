//! Project resource types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::validation;

/// A project as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Number of tasks filed under this project.
    #[serde(default)]
    pub task_count: u64,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// Request body for creating a project.
#[derive(Debug, Clone, Serialize)]
pub struct NewProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validation::validate_name("name", &self.name)
    }
}

/// Partial update of a project.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProjectUpdate {
    pub fn validate(&self) -> Result<()> {
        match self.name {
            Some(ref name) => validation::validate_name("name", name),
            None => Ok(()),
        }
    }
}
