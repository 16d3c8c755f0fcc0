//! In-process `PortalApi` used by the client tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::client::api::PortalApi;
use crate::data::sample_courses;
use crate::error::AppError;
use crate::filter::filter_courses;
use crate::models::{Course, Enrollment, SearchParams};

/// Holds a call open until the test releases it.
#[derive(Clone, Default)]
pub struct Gate {
    entered: Arc<Notify>,
    released: Arc<Notify>,
}

impl Gate {
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.released.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.released.notified().await;
    }
}

pub struct FakeApi {
    courses: Vec<Course>,
    enrolled: Mutex<Vec<String>>,
    failing: bool,
    gate: Option<Gate>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            courses: sample_courses(),
            enrolled: Mutex::new(Vec::new()),
            failing: false,
            gate: None,
        }
    }
}

impl FakeApi {
    /// Every call fails as if the server were down.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_enrollments(self, ids: &[&str]) -> Self {
        Self {
            enrolled: Mutex::new(ids.iter().map(|id| id.to_string()).collect()),
            ..self
        }
    }

    pub fn with_gate(self) -> Self {
        Self {
            gate: Some(Gate::default()),
            ..self
        }
    }

    pub fn gate(&self) -> Gate {
        self.gate.clone().unwrap_or_default()
    }

    async fn call(&self) -> Result<(), AppError> {
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        if self.failing {
            return Err(AppError::InternalServerError("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PortalApi for FakeApi {
    async fn fetch_courses(&self, params: &SearchParams) -> Result<Vec<Course>, AppError> {
        self.call().await?;
        let query = params.query.clone().unwrap_or_default();
        let category = params.category.clone().unwrap_or_default();
        let category = if query.is_empty() { category } else { String::new() };
        Ok(filter_courses(&self.courses, &query, &category))
    }

    async fn fetch_course(&self, id: &str) -> Result<Course, AppError> {
        self.call().await?;
        self.courses
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))
    }

    async fn fetch_enrollments(&self) -> Result<Vec<String>, AppError> {
        self.call().await?;
        Ok(self.enrolled.lock().map(|ids| ids.clone()).unwrap_or_default())
    }

    async fn enroll(&self, course_id: &str) -> Result<Enrollment, AppError> {
        self.call().await?;
        let mut enrolled = self
            .enrolled
            .lock()
            .map_err(|_| AppError::InternalServerError("poisoned".to_string()))?;
        if enrolled.iter().any(|id| id == course_id) {
            return Err(AppError::Conflict("Already enrolled in this course".to_string()));
        }
        enrolled.push(course_id.to_string());
        Ok(Enrollment::new("demo-user", course_id))
    }

    async fn unenroll(&self, course_id: &str) -> Result<String, AppError> {
        self.call().await?;
        let mut enrolled = self
            .enrolled
            .lock()
            .map_err(|_| AppError::InternalServerError("poisoned".to_string()))?;
        let Some(index) = enrolled.iter().position(|id| id == course_id) else {
            return Err(AppError::NotFound("Not enrolled in this course".to_string()));
        };
        enrolled.remove(index);
        Ok(course_id.to_string())
    }
}
