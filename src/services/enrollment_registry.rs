use std::collections::HashMap;
use std::sync::Mutex;

use tracing::info;

use crate::error::AppError;
use crate::models::Enrollment;

pub const DEFAULT_USER_ID: &str = "demo-user";

/// Server-side enrollments, kept for the lifetime of the process and scoped
/// per user. Lives in `AppState`, so every router owns its own registry.
#[derive(Debug, Default)]
pub struct EnrollmentRegistry {
    by_user: Mutex<HashMap<String, Vec<String>>>,
}

impl EnrollmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<String>>> {
        // a poisoned map is still a consistent list of ids
        self.by_user.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn list(&self, user_id: &str) -> Vec<String> {
        self.lock().get(user_id).cloned().unwrap_or_default()
    }

    pub fn enroll(&self, user_id: &str, course_id: &str) -> Result<Enrollment, AppError> {
        let mut by_user = self.lock();
        let enrolled = by_user.entry(user_id.to_string()).or_default();

        if enrolled.iter().any(|id| id == course_id) {
            return Err(AppError::Conflict("Already enrolled in this course".to_string()));
        }
        enrolled.push(course_id.to_string());
        info!("User {} enrolled in course {}", user_id, course_id);

        Ok(Enrollment::new(user_id, course_id))
    }

    pub fn unenroll(&self, user_id: &str, course_id: &str) -> Result<String, AppError> {
        let mut by_user = self.lock();
        let enrolled = by_user.entry(user_id.to_string()).or_default();

        let Some(index) = enrolled.iter().position(|id| id == course_id) else {
            return Err(AppError::NotFound("Not enrolled in this course".to_string()));
        };
        enrolled.remove(index);
        info!("User {} unenrolled from course {}", user_id, course_id);

        Ok(course_id.to_string())
    }
}
