//! File-based session storage for the CLI
//!
//! [`FileStore`] is the durable [`KeyValueStore`] behind the CLI's
//! persistence context. It holds what the auth state persists between runs:
//! the access token, the refresh token and the serialized user.
//!
//! # File Location
//!
//! `<config dir>/medisite/session.toml` unless `[storage] session_file` or
//! `--session-file` says otherwise.
//!
//! # Security
//!
//! - File permissions set to 0600 (owner read/write only) on Unix
//! - Passwords are never written, only the tokens the server issued
//!
//! # File Format
//!
//! ```toml
//! [session]
//! access_token = "1|q8Zm..."
//! refresh_token = "..."
//! user = '{"id":1,"name":"Dr. Rahman",...}'
//! ```

use medisite_link::{KeyValueStore, LinkError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// TOML-file backed key/value store.
///
/// Values are cached in memory and every write rewrites the whole file.
#[derive(Debug)]
pub struct FileStore {
    file_path: PathBuf,
    cache: Mutex<BTreeMap<String, String>>,
}

/// Top-level TOML structure
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    session: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `file_path`, reading existing values.
    ///
    /// A missing file is an empty store; it is created on first write.
    pub fn open(file_path: impl Into<PathBuf>) -> Result<Self> {
        let file_path = file_path.into();
        let values = Self::load_from_disk(&file_path)?;
        Ok(Self {
            file_path,
            cache: Mutex::new(values),
        })
    }

    /// Get the file path used by this store
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_from_disk(path: &Path) -> Result<BTreeMap<String, String>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            LinkError::StorageError(format!(
                "Cannot read session file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let file: SessionFile = toml::from_str(&contents).map_err(|e| {
            LinkError::StorageError(format!(
                "Corrupted session file '{}' ({}). Delete it and run `medisite login` again.",
                path.display(),
                e.message()
            ))
        })?;
        Ok(file.session)
    }

    fn save_to_disk(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let file = SessionFile {
            session: values.clone(),
        };
        let contents = toml::to_string_pretty(&file).map_err(|e| {
            LinkError::StorageError(format!("Failed to serialize session: {}", e))
        })?;

        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LinkError::StorageError(format!(
                    "Failed to create session directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        fs::write(&self.file_path, contents).map_err(|e| {
            LinkError::StorageError(format!(
                "Failed to write session file '{}': {}",
                self.file_path.display(),
                e
            ))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.file_path, permissions).map_err(|e| {
                LinkError::StorageError(format!(
                    "Failed to set file permissions for '{}': {}",
                    self.file_path.display(),
                    e
                ))
            })?;
        }

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.lock();
        values.insert(key.to_string(), value.to_string());
        self.save_to_disk(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.lock();
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.save_to_disk(&values)
    }
}
