use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db::repository;
use crate::error::AppError;
use crate::models::Course;

/// Read access to a course catalog. `needle` arguments are lowercased by
/// the caller and matched as given.
#[async_trait]
pub trait CourseStore: Send + Sync {
    fn name(&self) -> &'static str;

    /// Prepares the store before first use, seeding it with `seed` when empty.
    async fn initialize(&self, _seed: &[Course]) -> Result<(), AppError> {
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<Course>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Course>, AppError>;
    async fn search(&self, needle: &str) -> Result<Vec<Course>, AppError>;
    async fn fetch_by_category(&self, category: &str) -> Result<Vec<Course>, AppError>;
}

/// Document store on SQLite. Rows are addressable by their native `doc_id`
/// and by the client-assigned course id.
pub struct SqliteCourseStore {
    db: SqlitePool,
}

impl SqliteCourseStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }
}

#[async_trait]
impl CourseStore for SqliteCourseStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn initialize(&self, seed: &[Course]) -> Result<(), AppError> {
        let count = repository::count_courses(&self.db).await?;
        if count == 0 {
            repository::insert_courses(&self.db, seed).await?;
            info!("Seeded {} sample courses into the course store", seed.len());
        }
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<Course>, AppError> {
        Ok(repository::fetch_courses(&self.db).await?)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Course>, AppError> {
        if let Ok(doc_id) = Uuid::parse_str(id) {
            if let Some(course) = repository::find_course_by_doc_id(&self.db, &doc_id).await? {
                return Ok(Some(course));
            }
        }
        Ok(repository::find_course_by_id(&self.db, id).await?)
    }

    async fn search(&self, needle: &str) -> Result<Vec<Course>, AppError> {
        Ok(repository::search_courses(&self.db, needle).await?)
    }

    async fn fetch_by_category(&self, category: &str) -> Result<Vec<Course>, AppError> {
        Ok(repository::fetch_courses_by_category(&self.db, category).await?)
    }
}

/// Fixed in-process dataset. Never fails.
#[derive(Debug, Clone)]
pub struct StaticCourseStore {
    courses: Vec<Course>,
}

impl StaticCourseStore {
    pub fn new(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }
}

#[async_trait]
impl CourseStore for StaticCourseStore {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch_all(&self) -> Result<Vec<Course>, AppError> {
        Ok(self.courses.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Course>, AppError> {
        Ok(self.courses.iter().find(|c| c.id == id).cloned())
    }

    async fn search(&self, needle: &str) -> Result<Vec<Course>, AppError> {
        Ok(self
            .courses
            .iter()
            .filter(|c| c.matches_query(needle))
            .cloned()
            .collect())
    }

    async fn fetch_by_category(&self, category: &str) -> Result<Vec<Course>, AppError> {
        Ok(self
            .courses
            .iter()
            .filter(|c| c.in_category(category))
            .cloned()
            .collect())
    }
}
