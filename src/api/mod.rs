use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query};
use axum::http::HeaderMap;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::error::AppError;
use crate::models::*;
use crate::services::DEFAULT_USER_ID;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Raw `GET /courses` parameters. Numbers are parsed leniently: anything
/// unparsable falls back to the default.
#[derive(Debug, Default, Deserialize)]
struct CourseQueryParams {
    query: Option<String>,
    category: Option<String>,
    level: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses))
        .route("/courses/{id}", get(get_course))
        .route(
            "/enrollment",
            get(list_enrollments).post(enroll).delete(unenroll),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<CourseQueryParams>,
) -> Json<PagedResponse<Course>> {
    let query = params.query.unwrap_or_default();
    let category = params.category.unwrap_or_default();
    let level = params.level.unwrap_or_default();
    let page = parse_or(params.page.as_deref(), DEFAULT_PAGE).max(1);
    let limit = parse_or(params.limit.as_deref(), DEFAULT_LIMIT);

    let mut courses = if !query.is_empty() {
        state.courses.search(&query).await
    } else if !category.is_empty() {
        state.courses.get_by_category(&category).await
    } else {
        state.courses.get_all().await
    };

    if !level.is_empty() {
        courses.retain(|course| course.level.as_str().eq_ignore_ascii_case(&level));
    }

    let total = courses.len();
    let start = (page - 1).saturating_mul(limit);
    let data: Vec<Course> = courses.into_iter().skip(start).take(limit).collect();
    debug!("GET /courses -> {} of {} (page {}, limit {})", data.len(), total, page, limit);

    Json(PagedResponse {
        success: true,
        data: Some(data),
        error: None,
        total,
        page,
        limit,
    })
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Course>>, AppError> {
    let course = state
        .courses
        .get_by_id(&id)
        .await
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
    Ok(Json(ApiResponse::ok(course)))
}

async fn list_enrollments(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::ok(state.enrollments.list(&user_id(&headers))))
}

async fn enroll(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<Enrollment>>, AppError> {
    let course_id = course_id_from(&body)?;
    let enrollment = state.enrollments.enroll(&user_id(&headers), &course_id)?;
    Ok(Json(
        ApiResponse::ok(enrollment).with_message("Successfully enrolled in course"),
    ))
}

async fn unenroll(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let course_id = course_id_from(&body)?;
    let removed = state.enrollments.unenroll(&user_id(&headers), &course_id)?;
    Ok(Json(
        ApiResponse::ok(removed).with_message("Successfully unenrolled from course"),
    ))
}

fn user_id(headers: &HeaderMap) -> String {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_USER_ID)
        .to_string()
}

/// A missing, empty or unreadable body all count as a missing course id.
fn course_id_from(body: &[u8]) -> Result<String, AppError> {
    serde_json::from_slice::<EnrollmentRequest>(body)
        .ok()
        .and_then(|req| req.course_id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Course ID is required".to_string()))
}

fn parse_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(default)
}
