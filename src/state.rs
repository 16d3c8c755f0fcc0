use std::sync::Arc;

use crate::services::{CourseRepository, EnrollmentRegistry};

#[derive(Clone)]
pub struct AppState {
    pub courses: Arc<CourseRepository>,
    pub enrollments: Arc<EnrollmentRegistry>,
}

impl AppState {
    pub fn new(courses: CourseRepository) -> Self {
        Self {
            courses: Arc::new(courses),
            enrollments: Arc::new(EnrollmentRegistry::new()),
        }
    }
}
