//! Client side of the portal: the HTTP API wrapper plus the state a user
//! session keeps between calls.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod enrollment;
pub mod notifications;
pub mod session;

#[cfg(test)]
pub mod testing;

pub use api::{HttpPortalApi, PortalApi};
pub use cache::{EnrollmentCache, JsonFileCache, MemoryCache, ENROLLED_COURSES_KEY};
pub use catalog::{CatalogState, CourseCatalog};
pub use enrollment::{EnrollmentState, EnrollmentStore};
pub use notifications::{NotificationQueue, QueueEvent};
pub use session::PortalSession;
