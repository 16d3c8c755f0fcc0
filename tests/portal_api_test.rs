use std::net::SocketAddr;
use std::sync::Arc;

use training_portal::api::router;
use training_portal::client::{
    EnrollmentCache, EnrollmentStore, HttpPortalApi, JsonFileCache, PortalApi, PortalSession,
};
use training_portal::config::ClientConfig;
use training_portal::data::sample_courses;
use training_portal::db;
use training_portal::error::AppError;
use training_portal::models::SearchParams;
use training_portal::services::CourseRepository;
use training_portal::state::AppState;
use training_portal::store::{CourseStore, SqliteCourseStore};

async fn spawn_portal(courses: CourseRepository) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    let app = router(AppState::new(courses));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server stopped");
    });
    addr
}

fn api_for(addr: SocketAddr, user: &str) -> HttpPortalApi {
    HttpPortalApi::new(&format!("http://{}", addr))
        .expect("Failed to build portal client")
        .with_user(user)
}

#[tokio::test]
async fn test_courses_over_http() {
    let addr = spawn_portal(CourseRepository::fallback_only()).await;
    let api = api_for(addr, "alice");

    let all = api.fetch_courses(&SearchParams::default()).await.unwrap();
    assert_eq!(all.len(), 6);

    let found = api.fetch_courses(&SearchParams::query("aws")).await.unwrap();
    let ids: Vec<&str> = found.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["6"]);

    let page = SearchParams {
        page: Some(2),
        limit: Some(4),
        ..SearchParams::default()
    };
    assert_eq!(api.fetch_courses(&page).await.unwrap().len(), 2);

    let course = api.fetch_course("3").await.unwrap();
    assert_eq!(course.title, "Digital Marketing Fundamentals");

    let err = api.fetch_course("999").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref m) if m == "Course not found"));
}

#[tokio::test]
async fn test_enrollment_lifecycle_over_http() {
    let addr = spawn_portal(CourseRepository::fallback_only()).await;
    let api = api_for(addr, "bob");

    let enrollment = api.enroll("5").await.unwrap();
    assert_eq!(enrollment.course_id, "5");
    assert_eq!(enrollment.progress, 0);

    let err = api.enroll("5").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(ref m) if m == "Already enrolled in this course"));

    assert_eq!(api.fetch_enrollments().await.unwrap(), vec!["5"]);
    // another user sees their own list
    assert!(api_for(addr, "carol").fetch_enrollments().await.unwrap().is_empty());

    assert_eq!(api.unenroll("5").await.unwrap(), "5");
    let err = api.unenroll("5").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref m) if m == "Not enrolled in this course"));
}

#[tokio::test]
async fn test_sqlite_backed_portal_serves_seeded_courses() {
    let pool = db::connect_in_memory().await.unwrap();
    let store: Arc<dyn CourseStore> = Arc::new(SqliteCourseStore::new(pool));
    let addr = spawn_portal(CourseRepository::new(Some(store))).await;
    let api = api_for(addr, "dana");

    let courses = api.fetch_courses(&SearchParams::default()).await.unwrap();
    let expected: Vec<String> = sample_courses().into_iter().map(|c| c.id).collect();
    let ids: Vec<String> = courses.into_iter().map(|c| c.id).collect();
    assert_eq!(ids, expected);

    let security = SearchParams {
        category: Some("Security".to_string()),
        ..SearchParams::default()
    };
    let found = api.fetch_courses(&security).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].instructor, "Dr. Lisa Wang");
}

#[tokio::test]
async fn test_cached_enrollments_survive_restart_and_merge() {
    let addr = spawn_portal(CourseRepository::fallback_only()).await;
    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("enrolled_courses.json");

    // the server already knows about "2" for this user
    api_for(addr, "erin").enroll("2").await.unwrap();

    {
        let cache: Arc<dyn EnrollmentCache> = Arc::new(JsonFileCache::new(&cache_path));
        let store = EnrollmentStore::new(cache, Arc::new(api_for(addr, "erin")));
        store.add("4");
        store.fetch_remote().await.unwrap();
        assert_eq!(store.list(), vec!["4", "2"]);
    }

    let cache: Arc<dyn EnrollmentCache> = Arc::new(JsonFileCache::new(&cache_path));
    assert_eq!(cache.load(), vec!["4", "2"]);
}

#[tokio::test]
async fn test_session_notifies_enrollment_outcomes() {
    let addr = spawn_portal(CourseRepository::fallback_only()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig {
        api_url: format!("http://{}", addr),
        cache_path: dir.path().join("cache.json"),
    };
    let session = PortalSession::from_config(&config, "frank").unwrap();
    session.start().await.unwrap();

    session.enroll("1").await.unwrap();
    assert_eq!(
        session.notifications.latest().map(|n| n.title),
        Some("Enrollment Successful".to_string())
    );

    session.enroll("1").await.unwrap_err();
    let note = session.notifications.latest().unwrap();
    assert_eq!(note.title, "Enrollment Failed");
    assert_eq!(session.enrollments.error().as_deref(), Some("Failed to enroll in course"));
    assert_eq!(session.enrollments.list(), vec!["1"]);

    let enrolled: Vec<String> = session.enrolled_courses().into_iter().map(|c| c.id).collect();
    assert_eq!(enrolled, vec!["1"]);
}
