use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use crate::client::api::PortalApi;
use crate::error::AppError;
use crate::filter::FilterState;
use crate::models::{Course, CourseLevel, SearchParams};

#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    pub courses: Vec<Course>,
    pub filter: FilterState,
    pub filtered: Vec<Course>,
    pub loading: bool,
    pub error: Option<String>,
}

impl CatalogState {
    fn refilter(&mut self) {
        self.filtered = self.filter.apply(&self.courses);
    }
}

/// Client view of the course catalog: the fetched courses plus the
/// filtered subset the user is looking at.
pub struct CourseCatalog {
    state: Mutex<CatalogState>,
    api: Arc<dyn PortalApi>,
}

impl CourseCatalog {
    pub fn new(api: Arc<dyn PortalApi>) -> Self {
        Self {
            state: Mutex::new(CatalogState::default()),
            api,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> CatalogState {
        self.lock().clone()
    }

    pub fn courses(&self) -> Vec<Course> {
        self.lock().courses.clone()
    }

    pub fn filtered(&self) -> Vec<Course> {
        self.lock().filtered.clone()
    }

    pub fn set_search_query(&self, query: &str) {
        let mut state = self.lock();
        state.filter.query = query.to_string();
        state.refilter();
    }

    pub fn set_selected_category(&self, category: &str) {
        let mut state = self.lock();
        state.filter.category = category.to_string();
        state.refilter();
    }

    pub fn clear_filters(&self) {
        let mut state = self.lock();
        state.filter.clear();
        state.filtered = state.courses.clone();
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
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

    /// Replaces the course list from `GET /courses` and re-applies the
    /// current filter.
    pub async fn refresh(&self, params: &SearchParams) -> Result<(), AppError> {
        self.begin();
        match self.api.fetch_courses(params).await {
            Ok(courses) => {
                let mut state = self.lock();
                state.loading = false;
                state.courses = courses;
                state.refilter();
                Ok(())
            }
            Err(e) => {
                self.fail("Failed to fetch courses", &e);
                Err(e)
            }
        }
    }

    /// Server-side search. The results become the filtered view as-is; the
    /// full course list is left alone.
    pub async fn search_remote(&self, query: &str) -> Result<(), AppError> {
        self.begin();
        match self.api.fetch_courses(&SearchParams::query(query)).await {
            Ok(found) => {
                let mut state = self.lock();
                state.loading = false;
                state.filtered = found;
                Ok(())
            }
            Err(e) => {
                self.fail("Failed to search courses", &e);
                Err(e)
            }
        }
    }

    /// Fetches one course and replaces the record with the same id, or
    /// appends it when unseen.
    pub async fn fetch_course_by_id(&self, id: &str) -> Result<Course, AppError> {
        self.begin();
        match self.api.fetch_course(id).await {
            Ok(course) => {
                let mut state = self.lock();
                state.loading = false;
                match state.courses.iter_mut().find(|c| c.id == course.id) {
                    Some(existing) => *existing = course.clone(),
                    None => state.courses.push(course.clone()),
                }
                state.refilter();
                Ok(course)
            }
            Err(e) => {
                self.fail("Failed to fetch course", &e);
                Err(e)
            }
        }
    }

    pub fn course(&self, id: &str) -> Option<Course> {
        self.lock().courses.iter().find(|c| c.id == id).cloned()
    }

    /// Known courses whose id is in `enrolled`, in catalog order.
    pub fn enrolled_courses(&self, enrolled: &[String]) -> Vec<Course> {
        self.lock()
            .courses
            .iter()
            .filter(|c| enrolled.contains(&c.id))
            .cloned()
            .collect()
    }

    pub fn categories(&self) -> Vec<String> {
        distinct(self.lock().courses.iter().map(|c| c.category.clone()))
    }

    pub fn instructors(&self) -> Vec<String> {
        distinct(self.lock().courses.iter().map(|c| c.instructor.clone()))
    }

    pub fn levels(&self) -> Vec<CourseLevel> {
        self.lock()
            .courses
            .iter()
            .map(|c| c.level)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn distinct(values: impl Iterator<Item = String>) -> Vec<String> {
    values.collect::<BTreeSet<_>>().into_iter().collect()
}
