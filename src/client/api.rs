use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::AppError;
use crate::models::{ApiResponse, Course, Enrollment, PagedResponse, SearchParams};

/// Calls the portal HTTP API on behalf of one user.
#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn fetch_courses(&self, params: &SearchParams) -> Result<Vec<Course>, AppError>;
    async fn fetch_course(&self, id: &str) -> Result<Course, AppError>;
    async fn fetch_enrollments(&self) -> Result<Vec<String>, AppError>;
    async fn enroll(&self, course_id: &str) -> Result<Enrollment, AppError>;
    async fn unenroll(&self, course_id: &str) -> Result<String, AppError>;
}

pub struct HttpPortalApi {
    client: Client,
    base_url: Url,
    user_id: Option<String>,
}

impl HttpPortalApi {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        let mut base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid portal url {}: {}", base_url, e)))?;
        // relative joins below would otherwise replace the last path segment
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client,
            base_url,
            user_id: None,
        })
    }

    /// Sends `x-user-id` with every request.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    fn url(&self, path: &str) -> Result<Url, AppError> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::BadRequest(format!("Invalid path {}: {}", path, e)))
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.user_id {
            Some(user_id) => builder.header(crate::api::USER_ID_HEADER, user_id),
            None => builder,
        }
    }
}

/// Maps non-2xx statuses to the matching `AppError`, using the `error`
/// field of the response envelope when there is one.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
        .ok()
        .and_then(|envelope| envelope.error)
        .unwrap_or_else(|| format!("Portal API error {}: {}", status, body));

    Err(match status.as_u16() {
        400 => AppError::BadRequest(message),
        404 => AppError::NotFound(message),
        409 => AppError::Conflict(message),
        _ => AppError::InternalServerError(message),
    })
}

fn into_data<T>(envelope: ApiResponse<T>) -> Result<T, AppError> {
    match envelope.data {
        Some(data) if envelope.success => Ok(data),
        _ => Err(AppError::InternalServerError(
            envelope.error.unwrap_or_else(|| "Missing response data".to_string()),
        )),
    }
}

#[async_trait]
impl PortalApi for HttpPortalApi {
    async fn fetch_courses(&self, params: &SearchParams) -> Result<Vec<Course>, AppError> {
        let mut url = self.url("courses")?;
        let pairs = params.to_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let response = self.request(reqwest::Method::GET, url).send().await?;
        let page: PagedResponse<Course> = decode(response).await?;
        Ok(page.data.unwrap_or_default())
    }

    async fn fetch_course(&self, id: &str) -> Result<Course, AppError> {
        let mut url = self.url("courses")?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config("Portal url cannot have a path".to_string()))?
            .push(id);

        let response = self.request(reqwest::Method::GET, url).send().await?;
        into_data(decode(response).await?)
    }

    async fn fetch_enrollments(&self) -> Result<Vec<String>, AppError> {
        let response = self
            .request(reqwest::Method::GET, self.url("enrollment")?)
            .send()
            .await?;
        into_data(decode(response).await?)
    }

    async fn enroll(&self, course_id: &str) -> Result<Enrollment, AppError> {
        let response = self
            .request(reqwest::Method::POST, self.url("enrollment")?)
            .json(&json!({ "courseId": course_id }))
            .send()
            .await?;
        into_data(decode(response).await?)
    }

    async fn unenroll(&self, course_id: &str) -> Result<String, AppError> {
        let response = self
            .request(reqwest::Method::DELETE, self.url("enrollment")?)
            .json(&json!({ "courseId": course_id }))
            .send()
            .await?;
        into_data(decode(response).await?)
    }
}
