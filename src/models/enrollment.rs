use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Enrolled,
    Completed,
    Dropped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub enrolled_at: DateTime<Utc>,
    pub status: EnrollmentStatus,
    /// 0-100
    pub progress: u8,
}

impl Enrollment {
    pub fn new(user_id: &str, course_id: &str) -> Self {
        let enrolled_at = Utc::now();
        Self {
            id: enrolled_at.timestamp_millis().to_string(),
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            enrolled_at,
            status: EnrollmentStatus::Enrolled,
            progress: 0,
        }
    }
}

/// Body of `POST /enrollment` and `DELETE /enrollment`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRequest {
    #[serde(default)]
    pub course_id: Option<String>,
}
