use std::path::{Path, PathBuf};

use crate::core::errors::StorageError;
use crate::domain::{Profile, CURRENT_SCHEMA_VERSION};
use crate::storage::{BackupInfo, StorageBackend};

type Result<T> = std::result::Result<T, StorageError>;

/// Metadata describing the outcome of a load operation.
#[derive(Debug, Clone)]
pub struct LoadMetadata {
    pub warnings: Vec<String>,
    pub path: PathBuf,
    pub name: Option<String>,
    pub schema_version: u8,
}

/// Facade that coordinates profile state, persistence, and backups.
pub struct ProfileManager {
    pub current: Option<Profile>,
    current_name: Option<String>,
    current_path: Option<PathBuf>,
    storage: Box<dyn StorageBackend>,
}

impl ProfileManager {
    pub fn new(storage: Box<dyn StorageBackend>) -> Self {
        Self {
            current: None,
            current_name: None,
            current_path: None,
            storage,
        }
    }

    pub fn with_default_storage() -> Result<Self> {
        let storage = crate::storage::JsonStorage::new_default()?;
        Ok(Self::new(Box::new(storage)))
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn open(&mut self, name: &str) -> Result<LoadMetadata> {
        let profile = self.storage.load(name)?;
        self.ensure_schema_support(profile.schema_version)?;
        let path = self.storage.profile_path(name);
        Ok(self.install(profile, path, Some(name.to_string())))
    }

    pub fn open_path(&mut self, path: &Path) -> Result<LoadMetadata> {
        let profile = self.storage.load_from_path(path)?;
        self.ensure_schema_support(profile.schema_version)?;
        Ok(self.install(profile, path.to_path_buf(), None))
    }

    pub fn save(&mut self) -> Result<PathBuf> {
        let profile = self
            .current
            .as_ref()
            .ok_or_else(|| StorageError::Persistence("no profile loaded".into()))?;
        if let Some(name) = self.current_name.clone() {
            let path = self.storage.save(profile, &name)?;
            self.current_path = Some(path.clone());
            Ok(path)
        } else if let Some(path) = self.current_path.clone() {
            self.storage.save_to_path(profile, &path)?;
            Ok(path)
        } else {
            Err(StorageError::Persistence(
                "unable to determine save target for current profile".into(),
            ))
        }
    }

    pub fn save_as(&mut self, name: &str) -> Result<PathBuf> {
        let profile = self
            .current
            .as_ref()
            .ok_or_else(|| StorageError::Persistence("no profile loaded".into()))?;
        let path = self.storage.save(profile, name)?;
        self.current_name = Some(name.to_string());
        self.current_path = Some(path.clone());
        Ok(path)
    }

    pub fn save_to_path(&mut self, path: &Path) -> Result<()> {
        let profile = self
            .current
            .as_ref()
            .ok_or_else(|| StorageError::Persistence("no profile loaded".into()))?;
        self.storage.save_to_path(profile, path)?;
        self.current_path = Some(path.to_path_buf());
        self.current_name = None;
        Ok(())
    }

    pub fn backup(&self, note: Option<&str>) -> Result<PathBuf> {
        let profile = self
            .current
            .as_ref()
            .ok_or_else(|| StorageError::Persistence("no profile loaded".into()))?;
        let name = self
            .current_name
            .as_deref()
            .ok_or_else(|| StorageError::Persistence("current profile is unnamed".into()))?;
        self.storage.backup(profile, name, note)
    }

    pub fn backup_named(&self, name: &str, note: Option<&str>) -> Result<PathBuf> {
        let profile = self.storage.load(name)?;
        self.storage.backup(&profile, name, note)
    }

    pub fn list_backups(&self, name: &str) -> Result<Vec<BackupInfo>> {
        self.storage.list_backups(name)
    }

    /// Restores a backup over the live file and adopts the restored
    /// profile as current.
    pub fn restore_backup(&mut self, name: &str, backup_name: &str) -> Result<LoadMetadata> {
        let profile = self.storage.restore(name, backup_name)?;
        self.ensure_schema_support(profile.schema_version)?;
        let path = self.storage.profile_path(name);
        Ok(self.install(profile, path, Some(name.to_string())))
    }

    pub fn list_profiles(&self) -> Result<Vec<String>> {
        self.storage.list_profiles()
    }

    pub fn profile_path(&self, name: &str) -> PathBuf {
        self.storage.profile_path(name)
    }

    pub fn last_opened(&self) -> Result<Option<String>> {
        self.storage.last_profile()
    }

    pub fn record_last_opened(&self, name: Option<&str>) -> Result<()> {
        self.storage.record_last_profile(name)
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    pub fn set_current(&mut self, profile: Profile, path: Option<PathBuf>, name: Option<String>) {
        self.current = Some(profile);
        self.current_path = path;
        self.current_name = name;
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.current_name = None;
        self.current_path = None;
    }

    fn ensure_schema_support(&self, schema_version: u8) -> Result<()> {
        if schema_version > CURRENT_SCHEMA_VERSION {
            return Err(StorageError::Persistence(format!(
                "profile schema v{} is newer than supported v{}",
                schema_version, CURRENT_SCHEMA_VERSION
            )));
        }
        Ok(())
    }

    fn install(&mut self, profile: Profile, path: PathBuf, name: Option<String>) -> LoadMetadata {
        let warnings = profile_warnings(&profile);
        let schema_version = profile.schema_version;
        self.current = Some(profile);
        self.current_path = Some(path.clone());
        self.current_name = name.clone();
        LoadMetadata {
            warnings,
            path,
            name,
            schema_version,
        }
    }
}

/// Scans a freshly loaded profile for dangling references.
pub fn profile_warnings(profile: &Profile) -> Vec<String> {
    let mut warnings = Vec::new();
    for transaction in &profile.transactions {
        if let Some(category_id) = transaction.category_id {
            if profile.category(category_id).is_none() {
                warnings.push(format!(
                    "transaction `{}` references unknown category {}",
                    transaction.description, category_id
                ));
            }
        }
    }
    for budget in &profile.budgets {
        if let Some(category_id) = budget.category_id {
            if profile.category(category_id).is_none() {
                warnings.push(format!(
                    "budget `{}` references unknown category {}",
                    budget.name, category_id
                ));
            }
        }
    }
    for rule in &profile.rules {
        if profile.category(rule.category_id).is_none() {
            warnings.push(format!(
                "rule `{}` references unknown category {}",
                rule.name, rule.category_id
            ));
        }
    }
    for insight in &profile.insights {
        if let Some(budget_id) = insight.budget_id {
            if profile.budget(budget_id).is_none() {
                warnings.push(format!(
                    "insight `{}` references unknown budget {}",
                    insight.title, budget_id
                ));
            }
        }
        for transaction_id in &insight.transaction_ids {
            if profile.transaction(*transaction_id).is_none() {
                warnings.push(format!(
                    "insight `{}` references unknown transaction {}",
                    insight.title, transaction_id
                ));
            }
        }
    }
    warnings
}
