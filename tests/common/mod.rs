use std::sync::Mutex;

use debtwise::core::ProfileManager;
use debtwise::storage::JsonStorage;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated profile manager backed by a unique directory.
pub fn setup_profile_manager() -> ProfileManager {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let storage = JsonStorage::new(Some(base), Some(3)).expect("create json storage backend");
    ProfileManager::new(Box::new(storage))
}
