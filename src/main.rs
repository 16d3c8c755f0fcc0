use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use training_portal::api::router;
use training_portal::config::AppConfig;
use training_portal::db;
use training_portal::services::CourseRepository;
use training_portal::state::AppState;
use training_portal::store::{CourseStore, SqliteCourseStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "training_portal=debug,tower_http=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let preferred: Option<Arc<dyn CourseStore>> = match &config.database_url {
        Some(url) => match db::connect(url, config.max_connections).await {
            Ok(pool) => Some(Arc::new(SqliteCourseStore::new(pool))),
            Err(e) => {
                warn!("Course database unavailable, serving static courses: {}", e);
                None
            }
        },
        None => {
            info!("DATABASE_URL not set, serving static courses");
            None
        }
    };

    let state = AppState::new(CourseRepository::new(preferred));
    let app = router(state);

    let addr = config.addr();
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
