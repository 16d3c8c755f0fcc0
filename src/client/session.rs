use std::sync::Arc;

use tracing::info;

use crate::client::api::{HttpPortalApi, PortalApi};
use crate::client::cache::{EnrollmentCache, JsonFileCache};
use crate::client::catalog::CourseCatalog;
use crate::client::enrollment::EnrollmentStore;
use crate::client::notifications::NotificationQueue;
use crate::config::ClientConfig;
use crate::error::AppError;
use crate::models::{Course, SearchParams};

/// One signed-in user's view of the portal. Enrollment actions report their
/// outcome through the notification queue.
pub struct PortalSession {
    pub catalog: CourseCatalog,
    pub enrollments: EnrollmentStore,
    pub notifications: NotificationQueue,
}

impl PortalSession {
    pub fn new(api: Arc<dyn PortalApi>, cache: Arc<dyn EnrollmentCache>) -> Self {
        Self {
            catalog: CourseCatalog::new(api.clone()),
            enrollments: EnrollmentStore::new(cache, api),
            notifications: NotificationQueue::new(),
        }
    }

    /// Session against a running portal, caching enrollments on disk.
    pub fn from_config(config: &ClientConfig, user_id: &str) -> Result<Self, AppError> {
        let api = HttpPortalApi::new(&config.api_url)?.with_user(user_id);
        Ok(Self::new(
            Arc::new(api),
            Arc::new(JsonFileCache::new(&config.cache_path)),
        ))
    }

    /// Loads the catalog and merges the server's enrollments into the
    /// cached ones.
    pub async fn start(&self) -> Result<(), AppError> {
        self.catalog.refresh(&SearchParams::default()).await?;
        self.enrollments.fetch_remote().await?;
        info!(
            "Session ready with {} courses, {} enrolled",
            self.catalog.courses().len(),
            self.enrollments.list().len()
        );
        Ok(())
    }

    pub fn enrolled_courses(&self) -> Vec<Course> {
        self.catalog.enrolled_courses(&self.enrollments.list())
    }

    pub fn is_enrolled(&self, course_id: &str) -> bool {
        self.enrollments.contains(course_id)
    }

    fn title_of(&self, course_id: &str) -> String {
        self.catalog
            .course(course_id)
            .map(|c| c.title)
            .unwrap_or_else(|| course_id.to_string())
    }

    pub async fn enroll(&self, course_id: &str) -> Result<(), AppError> {
        match self.enrollments.enroll_remote(course_id).await {
            Ok(()) => {
                self.notifications.success(
                    "Enrollment Successful",
                    format!("You have been enrolled in \"{}\" successfully!", self.title_of(course_id)),
                );
                Ok(())
            }
            Err(e) => {
                self.notifications.error(
                    "Enrollment Failed",
                    "Failed to enroll in the course. Please try again.",
                );
                Err(e)
            }
        }
    }

    pub async fn unenroll(&self, course_id: &str) -> Result<(), AppError> {
        match self.enrollments.unenroll_remote(course_id).await {
            Ok(()) => {
                self.notifications.success(
                    "Unenrollment Successful",
                    format!("You have been unenrolled from \"{}\".", self.title_of(course_id)),
                );
                Ok(())
            }
            Err(e) => {
                self.notifications.error(
                    "Unenrollment Failed",
                    "Failed to unenroll from the course. Please try again.",
                );
                Err(e)
            }
        }
    }
}
