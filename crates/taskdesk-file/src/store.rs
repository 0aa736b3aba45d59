//! JSON file token store.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use taskdesk_core::Result;
use taskdesk_core::error::StorageError;
use taskdesk_core::traits::TokenStorage;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

type Entries = BTreeMap<String, String>;

/// Token storage backed by a single JSON object file.
///
/// Writes go through a temporary file and a rename while holding an
/// exclusive lock on a sibling `.lock` file, so concurrent processes never
/// observe a half-written store. A missing file reads as an empty store.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

fn io_error(path: &Path, source: std::io::Error) -> taskdesk_core::Error {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
    .into()
}

impl FileStorage {
    /// Create a store at `path`. Nothing is touched until the first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    fn read_entries(&self) -> Result<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| io_error(&self.path, e))?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            StorageError::Corrupt {
                path: self.path.display().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        let temp = self.temp_path();
        let json = serde_json::to_string_pretty(entries).map_err(|e| StorageError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&temp)
                .map_err(|e| io_error(&temp, e))?;

            // Set restrictive permissions before any secret is written (Unix only)
            #[cfg(unix)]
            {
                let mut perms = file.metadata().map_err(|e| io_error(&temp, e))?.permissions();
                perms.set_mode(0o600);
                fs::set_permissions(&temp, perms).map_err(|e| io_error(&temp, e))?;
            }

            file.write_all(json.as_bytes())
                .map_err(|e| io_error(&temp, e))?;
            file.sync_data().map_err(|e| io_error(&temp, e))?;
        }

        fs::rename(&temp, &self.path).map_err(|e| io_error(&self.path, e))
    }

    /// Entries to modify. An unreadable store is replaced by an empty one so
    /// a damaged file never blocks login or logout; the flag is set when
    /// that happened and the file must be rewritten.
    fn read_for_write(&self) -> Result<(Entries, bool)> {
        match self.read_entries() {
            Ok(entries) => Ok((entries, false)),
            Err(taskdesk_core::Error::Storage(StorageError::Corrupt { message, .. })) => {
                warn!(error = %message, "Discarding unreadable token store");
                Ok((Entries::new(), true))
            }
            Err(err) => Err(err),
        }
    }

    /// Apply `change` to the stored entries under both the in-process and
    /// the cross-process lock.
    async fn modify(&self, change: impl FnOnce(&mut Entries) -> bool) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| io_error(&lock_path, e))?;

        lock_file
            .lock_exclusive()
            .map_err(|e| io_error(&lock_path, e))?;

        let result = self.read_for_write().and_then(|(mut entries, recovered)| {
            if change(&mut entries) || recovered {
                self.write_entries(&entries)
            } else {
                Ok(())
            }
        });

        lock_file.unlock().map_err(|e| io_error(&lock_path, e))?;

        result
    }
}

#[async_trait]
impl TokenStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.read_entries()?;
        Ok(entries.get(key).cloned())
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        debug!("Persisting token");
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
        .await
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn remove(&self, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        debug!("Removing token");
        self.modify(|entries| entries.remove(key).is_some()).await
    }
}
