//! Per-invocation client setup and session file location.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::debug;

use taskdesk_core::ApiUrl;
use taskdesk_file::FileStorage;
use taskdesk_http::{ClientConfig, SessionEvent, TaskDeskClient};

use crate::cli::Cli;
use crate::output;

/// Hint shown whenever a command needs a signed-in user.
pub const LOGIN_HINT: &str = "No active session. Run 'taskdesk auth login' first.";

/// Default session file path in the platform data directory.
fn default_session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "taskdesk").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// Everything a command needs: the client and how to print.
pub struct Context {
    pub client: TaskDeskClient,
    pub json: bool,
    events: Receiver<SessionEvent>,
}

impl Context {
    /// Build the client from flags and environment. With `restore`, the
    /// saved session is validated against the server first.
    pub async fn open(cli: &Cli, restore: bool) -> Result<Self> {
        let config = match cli.api_url {
            Some(ref url) => ClientConfig::new(ApiUrl::new(url).context("Invalid API URL")?),
            None => ClientConfig::default(),
        };

        let path = match cli.session_file {
            Some(ref path) => path.clone(),
            None => default_session_path()?,
        };
        debug!(path = %path.display(), api = %config.base_url, "Opening session");

        let storage = Arc::new(FileStorage::new(&path));
        let client =
            TaskDeskClient::new(config, storage).context("Failed to create API client")?;
        let events = client.subscribe();

        if restore {
            client.initialize().await;
        }

        Ok(Self {
            client,
            json: cli.json,
            events,
        })
    }

    /// Fail with a login hint unless a session was restored.
    pub async fn require_session(&self) -> Result<()> {
        if self.client.session().is_authenticated().await {
            Ok(())
        } else {
            anyhow::bail!(LOGIN_HINT)
        }
    }

    /// Tell the user if the server ended the session during this run.
    pub fn report_login_required(&mut self) {
        let mut expired = false;
        loop {
            match self.events.try_recv() {
                Ok(event) => expired |= event == SessionEvent::LoginRequired,
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        if expired {
            output::error("Your session has expired. Run 'taskdesk auth login' to sign in again.");
        }
    }
}
