//! Persistence backends for profiles.
//!
//! The default backend keeps one pretty-printed JSON document per profile
//! and rotates timestamped backups beside it. Alternative backends plug in
//! through [`StorageBackend`].

mod json_backend;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::core::errors::StorageError;
use crate::domain::Profile;

pub use json_backend::{load_profile_from_path, save_profile_to_path, JsonStorage};

pub type Result<T> = std::result::Result<T, StorageError>;

/// A snapshot of a profile kept under the backup directory.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub file_name: String,
    pub path: PathBuf,
    pub created_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

/// Contract every profile store must honor.
pub trait StorageBackend: Send + Sync {
    /// Persists the profile under `name` and returns the path written.
    fn save(&self, profile: &Profile, name: &str) -> Result<PathBuf>;

    /// Loads the profile stored under `name`.
    fn load(&self, name: &str) -> Result<Profile>;

    /// Resolves the on-disk path a profile name maps to.
    fn profile_path(&self, name: &str) -> PathBuf;

    /// Lists stored profile names, sorted.
    fn list_profiles(&self) -> Result<Vec<String>>;

    /// Lists backups for `name`, newest first.
    fn list_backups(&self, name: &str) -> Result<Vec<BackupInfo>>;

    /// Writes a timestamped backup, optionally labeled with `note`.
    fn backup(&self, profile: &Profile, name: &str, note: Option<&str>) -> Result<PathBuf>;

    /// Copies a backup over the live profile file and reloads it.
    fn restore(&self, name: &str, backup_name: &str) -> Result<Profile>;

    /// Name of the profile opened most recently, if recorded.
    fn last_profile(&self) -> Result<Option<String>>;

    /// Records (or clears) the most recently opened profile.
    fn record_last_profile(&self, name: Option<&str>) -> Result<()>;

    /// Saves to an explicit path, bypassing name resolution.
    fn save_to_path(&self, profile: &Profile, path: &Path) -> Result<()> {
        save_profile_to_path(profile, path)
    }

    /// Loads from an explicit path, bypassing name resolution.
    fn load_from_path(&self, path: &Path) -> Result<Profile> {
        load_profile_from_path(path)
    }
}
