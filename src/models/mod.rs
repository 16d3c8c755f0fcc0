pub mod course;
pub mod enrollment;
pub mod notification;
pub mod response;
pub mod search;

pub use course::{Course, CourseLevel};
pub use enrollment::{Enrollment, EnrollmentRequest, EnrollmentStatus};
pub use notification::{Notification, NotificationType};
pub use response::{ApiResponse, PagedResponse};
pub use search::{SearchParams, DEFAULT_LIMIT, DEFAULT_PAGE};
