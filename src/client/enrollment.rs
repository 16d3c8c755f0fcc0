use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::client::api::PortalApi;
use crate::client::cache::EnrollmentCache;
use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentState {
    pub enrolled: Vec<String>,
    pub loading: bool,
    pub error: Option<String>,
}

/// The current user's enrolled course ids.
///
/// Every mutation writes the whole list through the cache. Remote variants
/// go through the portal API and only touch the list on success; a failure
/// is recorded in `error` and leaves the list as it was.
pub struct EnrollmentStore {
    state: Mutex<EnrollmentState>,
    cache: Arc<dyn EnrollmentCache>,
    api: Arc<dyn PortalApi>,
}

impl EnrollmentStore {
    /// Reads the cache once to seed the list.
    pub fn new(cache: Arc<dyn EnrollmentCache>, api: Arc<dyn PortalApi>) -> Self {
        let enrolled = dedup(cache.load());
        debug!("Loaded {} cached enrollments", enrolled.len());
        Self {
            state: Mutex::new(EnrollmentState {
                enrolled,
                loading: false,
                error: None,
            }),
            cache,
            api,
        }
    }

    fn lock(&self) -> MutexGuard<'_, EnrollmentState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> EnrollmentState {
        self.lock().clone()
    }

    pub fn list(&self) -> Vec<String> {
        self.lock().enrolled.clone()
    }

    pub fn contains(&self, course_id: &str) -> bool {
        self.lock().enrolled.iter().any(|id| id == course_id)
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    pub fn add(&self, course_id: &str) {
        let mut state = self.lock();
        if !state.enrolled.iter().any(|id| id == course_id) {
            state.enrolled.push(course_id.to_string());
        }
        self.cache.save(&state.enrolled);
    }

    pub fn remove(&self, course_id: &str) {
        let mut state = self.lock();
        state.enrolled.retain(|id| id != course_id);
        self.cache.save(&state.enrolled);
    }

    /// Replaces the list wholesale. Duplicates keep their first position.
    pub fn set(&self, ids: Vec<String>) {
        let mut state = self.lock();
        state.enrolled = dedup(ids);
        self.cache.save(&state.enrolled);
    }

    /// Union of the local ids and `server_ids`: local ids first, then unseen
    /// server ids in their given order. Server data never removes a local id.
    pub fn reconcile(&self, server_ids: &[String]) {
        let mut state = self.lock();
        let merged = dedup(state.enrolled.iter().chain(server_ids).cloned().collect());
        state.enrolled = merged;
        self.cache.save(&state.enrolled);
    }

    fn begin(&self) {
        let mut state = self.lock();
        state.loading = true;
        state.error = None;
    }

    fn fail(&self, message: &str, cause: &AppError) {
        warn!("{}: {}", message, cause);
        let mut state = self.lock();
        state.loading = false;
        state.error = Some(message.to_string());
    }

    fn finish(&self) {
        self.lock().loading = false;
    }

    pub async fn enroll_remote(&self, course_id: &str) -> Result<(), AppError> {
        self.begin();
        match self.api.enroll(course_id).await {
            Ok(enrollment) => {
                self.finish();
                self.add(&enrollment.course_id);
                Ok(())
            }
            Err(e) => {
                self.fail("Failed to enroll in course", &e);
                Err(e)
            }
        }
    }

    pub async fn unenroll_remote(&self, course_id: &str) -> Result<(), AppError> {
        self.begin();
        match self.api.unenroll(course_id).await {
            Ok(removed) => {
                self.finish();
                self.remove(&removed);
                Ok(())
            }
            Err(e) => {
                self.fail("Failed to unenroll from course", &e);
                Err(e)
            }
        }
    }

    pub async fn fetch_remote(&self) -> Result<(), AppError> {
        self.begin();
        match self.api.fetch_enrollments().await {
            Ok(server_ids) => {
                self.finish();
                self.reconcile(&server_ids);
                Ok(())
            }
            Err(e) => {
                self.fail("Failed to fetch enrolled courses", &e);
                Err(e)
            }
        }
    }
}

fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}
