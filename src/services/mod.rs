pub mod course_repository;
pub mod enrollment_registry;

pub use course_repository::CourseRepository;
pub use enrollment_registry::{EnrollmentRegistry, DEFAULT_USER_ID};
