//! Message store module
//!
//! Keeps every submission in one JSON object on disk, keyed by submission
//! timestamp. The whole document is loaded, merged and rewritten on each save.
//! Rewrites go through a sibling temp file renamed over the store, so readers
//! always see either the previous or the new document.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::logger;

/// Field name to field value, one submitted form
pub type Record = BTreeMap<String, String>;

/// Record key (timestamp) to record, the whole store document
pub type Records = BTreeMap<String, Record>;

/// Timestamp layout used for record keys, e.g. `2024-03-01 14:05:09.123456`
const KEY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Generate a record key for the current local time
///
/// Two submissions within the same microsecond share a key; the later one wins.
pub fn timestamp_key() -> String {
    Local::now().format(KEY_FORMAT).to_string()
}

/// File-backed store
pub struct JsonStore {
    path: PathBuf,
    /// Serializes load+merge+write so concurrent saves cannot lose updates
    write_lock: Mutex<()>,
}

impl JsonStore {
    /// Open the store, creating the parent directory and an empty `{}`
    /// document when the file does not exist yet
    ///
    /// An existing file is left untouched, even if it is not valid JSON.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .await
                        .map_err(|source| unavailable(&path, source))?;
                }
            }
            fs::write(&path, b"{}")
                .await
                .map_err(|source| unavailable(&path, source))?;
            logger::write_info(&format!("Created empty store at {}", path.display()));
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the backing file without parsing it
    pub async fn raw(&self) -> Result<Vec<u8>> {
        fs::read(&self.path)
            .await
            .map_err(|source| unavailable(&self.path, source))
    }

    /// Load and parse the whole document
    pub async fn load(&self) -> Result<Records> {
        let content = self.raw().await?;
        serde_json::from_slice(&content).map_err(|source| AppError::StorageCorrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Overlay `new_entries` onto the stored document and rewrite the file
    ///
    /// Colliding keys are replaced by the new entry; all other keys are kept.
    pub async fn save(&self, new_entries: Records) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut current = self.load().await?;
        current.extend(new_entries);

        let serialized =
            serde_json::to_vec(&current).map_err(|source| AppError::StorageCorrupt {
                path: self.path.clone(),
                source,
            })?;

        let staging = self.staging_path();
        fs::write(&staging, serialized)
            .await
            .map_err(|source| unavailable(&staging, source))?;
        fs::rename(&staging, &self.path)
            .await
            .map_err(|source| unavailable(&self.path, source))
    }

    /// `.data.json.tmp` beside `data.json`; same directory so rename is atomic
    fn staging_path(&self) -> PathBuf {
        let mut name = OsString::from(".");
        name.push(self.path.file_name().unwrap_or_else(|| OsStr::new("store")));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn unavailable(path: &Path, source: std::io::Error) -> AppError {
    AppError::StorageUnavailable {
        path: path.to_path_buf(),
        source,
    }
}
