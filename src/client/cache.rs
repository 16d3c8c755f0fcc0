use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::Value;
use tracing::{error, warn};

/// Key under which the enrolled course ids are stored.
pub const ENROLLED_COURSES_KEY: &str = "enrolledCourses";

/// Durable home of the enrolled-id list. `load` never fails: an absent or
/// unreadable entry is an empty list.
pub trait EnrollmentCache: Send + Sync {
    fn load(&self) -> Vec<String>;
    fn save(&self, ids: &[String]);
}

/// Key-value JSON file holding the list under [`ENROLLED_COURSES_KEY`].
/// Other keys in the file are left untouched.
pub struct JsonFileCache {
    path: PathBuf,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_entries(&self) -> BTreeMap<String, Value> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }
}

impl EnrollmentCache for JsonFileCache {
    fn load(&self) -> Vec<String> {
        let Some(entry) = self.read_entries().remove(ENROLLED_COURSES_KEY) else {
            return Vec::new();
        };
        serde_json::from_value(entry).unwrap_or_else(|e| {
            warn!("Ignoring corrupt enrolled courses in {}: {}", self.path.display(), e);
            Vec::new()
        })
    }

    fn save(&self, ids: &[String]) {
        let mut entries = self.read_entries();
        entries.insert(ENROLLED_COURSES_KEY.to_string(), Value::from(ids.to_vec()));

        let result = serde_json::to_string_pretty(&entries)
            .map_err(|e| e.to_string())
            .and_then(|raw| fs::write(&self.path, raw).map_err(|e| e.to_string()));
        if let Err(e) = result {
            error!("Error saving enrolled courses to {}: {}", self.path.display(), e);
        }
    }
}

/// In-process cache, for tests and sessions without a disk.
#[derive(Debug, Default)]
pub struct MemoryCache {
    ids: Mutex<Vec<String>>,
}

impl MemoryCache {
    pub fn with_ids(ids: &[&str]) -> Self {
        Self {
            ids: Mutex::new(ids.iter().map(|id| id.to_string()).collect()),
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.ids.lock().map(|ids| ids.clone()).unwrap_or_default()
    }
}

impl EnrollmentCache for MemoryCache {
    fn load(&self) -> Vec<String> {
        self.snapshot()
    }

    fn save(&self, ids: &[String]) {
        if let Ok(mut stored) = self.ids.lock() {
            *stored = ids.to_vec();
        }
    }
}
