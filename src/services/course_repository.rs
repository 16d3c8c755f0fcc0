use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use crate::data::sample_courses;
use crate::error::AppError;
use crate::models::Course;
use crate::store::{CourseStore, StaticCourseStore};

/// Course lookups against the preferred store, with the static dataset as a
/// transparent fallback. Store errors are logged and never reach the caller.
pub struct CourseRepository {
    preferred: Option<Arc<dyn CourseStore>>,
    fallback: Arc<dyn CourseStore>,
    seed: Vec<Course>,
    ready: OnceCell<bool>,
}

impl CourseRepository {
    pub fn new(preferred: Option<Arc<dyn CourseStore>>) -> Self {
        Self::with_fallback(preferred, StaticCourseStore::new(sample_courses()))
    }

    pub fn with_fallback(preferred: Option<Arc<dyn CourseStore>>, fallback: StaticCourseStore) -> Self {
        Self {
            preferred,
            seed: fallback.courses().to_vec(),
            fallback: Arc::new(fallback),
            ready: OnceCell::new(),
        }
    }

    pub fn fallback_only() -> Self {
        Self::new(None)
    }

    /// Initializes the preferred store on first call. A failed
    /// initialization pins the repository to the fallback for good.
    async fn active_store(&self) -> Option<&Arc<dyn CourseStore>> {
        let preferred = self.preferred.as_ref()?;

        let ready = *self
            .ready
            .get_or_init(|| async {
                match preferred.initialize(&self.seed).await {
                    Ok(()) => {
                        info!("Using {} store for course data", preferred.name());
                        true
                    }
                    Err(e) => {
                        warn!(
                            "{} store unavailable, falling back to sample data: {}",
                            preferred.name(),
                            e
                        );
                        false
                    }
                }
            })
            .await;

        ready.then_some(preferred)
    }

    /// Whether the preferred store is in use. Triggers initialization.
    pub async fn uses_preferred_store(&self) -> bool {
        self.active_store().await.is_some()
    }

    pub async fn get_all(&self) -> Vec<Course> {
        if let Some(store) = self.active_store().await {
            match store.fetch_all().await {
                Ok(courses) => return courses,
                Err(e) => warn!("Error fetching courses from {}, falling back: {}", store.name(), e),
            }
        }
        or_empty(self.fallback.fetch_all().await)
    }

    pub async fn get_by_id(&self, id: &str) -> Option<Course> {
        if let Some(store) = self.active_store().await {
            match store.find_by_id(id).await {
                Ok(course) => return course,
                Err(e) => warn!("Error fetching course {} from {}, falling back: {}", id, store.name(), e),
            }
        }
        or_empty(self.fallback.find_by_id(id).await)
    }

    /// Blank queries return every course. Any other query is matched as
    /// given, surrounding whitespace included.
    pub async fn search(&self, query: &str) -> Vec<Course> {
        if query.trim().is_empty() {
            return self.get_all().await;
        }
        let needle = query.to_lowercase();

        if let Some(store) = self.active_store().await {
            match store.search(&needle).await {
                Ok(courses) => return courses,
                Err(e) => warn!("Error searching {}, falling back: {}", store.name(), e),
            }
        }
        or_empty(self.fallback.search(&needle).await)
    }

    pub async fn get_by_category(&self, category: &str) -> Vec<Course> {
        if let Some(store) = self.active_store().await {
            match store.fetch_by_category(category).await {
                Ok(courses) => return courses,
                Err(e) => warn!(
                    "Error fetching category {} from {}, falling back: {}",
                    category,
                    store.name(),
                    e
                ),
            }
        }
        or_empty(self.fallback.fetch_by_category(category).await)
    }
}

fn or_empty<T: Default>(result: Result<T, AppError>) -> T {
    result.unwrap_or_else(|e| {
        error!("Fallback course store failed: {}", e);
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::db::connect_in_memory;
    use crate::store::SqliteCourseStore;

    /// Store whose initialization or reads fail on demand.
    struct FlakyStore {
        fail_init: bool,
        init_calls: AtomicUsize,
    }

    impl FlakyStore {
        fn new(fail_init: bool) -> Self {
            Self {
                fail_init,
                init_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CourseStore for FlakyStore {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn initialize(&self, _seed: &[Course]) -> Result<(), AppError> {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_init {
                Err(AppError::InternalServerError("connection refused".to_string()))
            } else {
                Ok(())
            }
        }

        async fn fetch_all(&self) -> Result<Vec<Course>, AppError> {
            Err(AppError::InternalServerError("read failed".to_string()))
        }

        async fn find_by_id(&self, _id: &str) -> Result<Option<Course>, AppError> {
            Err(AppError::InternalServerError("read failed".to_string()))
        }

        async fn search(&self, _needle: &str) -> Result<Vec<Course>, AppError> {
            Err(AppError::InternalServerError("read failed".to_string()))
        }

        async fn fetch_by_category(&self, _category: &str) -> Result<Vec<Course>, AppError> {
            Err(AppError::InternalServerError("read failed".to_string()))
        }
    }

    #[tokio::test]
    async fn test_fallback_only_serves_sample_data() {
        let repo = CourseRepository::fallback_only();

        assert!(!repo.uses_preferred_store().await);
        assert_eq!(repo.get_all().await.len(), 6);
        assert!(repo.get_by_id("999").await.is_none());

        let found = repo.search("javascript").await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "2");
        assert_eq!(found[0].title, "Advanced JavaScript Development");
    }

    #[tokio::test]
    async fn test_blank_search_returns_everything() {
        let repo = CourseRepository::fallback_only();
        assert_eq!(repo.search("   ").await.len(), 6);
    }

    #[tokio::test]
    async fn test_padded_search_matches_as_given() {
        let repo = CourseRepository::fallback_only();

        let ids: Vec<String> = repo.search("analytics ").await.into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["3"]);
        assert!(repo.search(" AWS").await.is_empty());
    }

    #[tokio::test]
    async fn test_custom_fallback_serves_every_lookup() {
        let mut only = sample_courses();
        only.truncate(2);
        let repo = CourseRepository::with_fallback(
            Some(Arc::new(FlakyStore::new(false))),
            StaticCourseStore::new(only),
        );

        assert_eq!(repo.get_all().await.len(), 2);
        assert!(repo.get_by_id("3").await.is_none());
        assert_eq!(repo.search("JavaScript").await[0].id, "2");
        assert_eq!(repo.get_by_category("data science").await[0].id, "1");
        assert!(repo.get_by_category("Security").await.is_empty());
    }

    #[tokio::test]
    async fn test_read_errors_fall_back_transparently() {
        let repo = CourseRepository::new(Some(Arc::new(FlakyStore::new(false))));

        assert!(repo.uses_preferred_store().await);
        assert_eq!(repo.get_all().await.len(), 6);
        assert_eq!(repo.get_by_id("3").await.map(|c| c.id), Some("3".to_string()));
        assert_eq!(repo.search("scrum").await[0].id, "4");
        assert_eq!(repo.get_by_category("cloud computing").await[0].id, "6");
    }

    #[tokio::test]
    async fn test_failed_initialization_is_not_retried() {
        let store = Arc::new(FlakyStore::new(true));
        let repo = CourseRepository::new(Some(store.clone() as Arc<dyn CourseStore>));

        assert_eq!(repo.get_all().await.len(), 6);
        assert_eq!(repo.search("aws").await.len(), 1);
        assert!(!repo.uses_preferred_store().await);
        assert_eq!(store.init_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sqlite_store_is_seeded_on_first_use() {
        let pool = connect_in_memory().await.unwrap();
        let repo = CourseRepository::new(Some(Arc::new(SqliteCourseStore::new(pool.clone()))));

        assert!(repo.uses_preferred_store().await);
        assert_eq!(repo.get_all().await, sample_courses());
        assert_eq!(repo.get_by_category("Security").await[0].id, "5");
    }

    #[tokio::test]
    async fn test_closed_pool_falls_back() {
        let pool = connect_in_memory().await.unwrap();
        let repo = CourseRepository::new(Some(Arc::new(SqliteCourseStore::new(pool.clone()))));
        assert!(repo.uses_preferred_store().await);

        pool.close().await;

        assert_eq!(repo.get_all().await.len(), 6);
        assert_eq!(repo.get_by_id("2").await.map(|c| c.id), Some("2".to_string()));
    }
}
