use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::error::AppError;

/// Server settings, read from the environment (and `.env` when present).
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Preferred course store. `None` runs on the static dataset only.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub host: IpAddr,
    pub port: u16,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 5)?;
        let host = parse_var("PORTAL_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_var("PORTAL_PORT", 3000)?;

        Ok(Self {
            database_url,
            max_connections,
            host,
            port,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Client settings for talking to a running portal.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub cache_path: PathBuf,
}

impl ClientConfig {
    pub fn new_from_env() -> Self {
        let api_url = env::var("PORTAL_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
        let cache_path = env::var("ENROLLMENT_CACHE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("enrolled_courses.json"));

        Self { api_url, cache_path }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    parse_value(key, env::var(key).ok(), default)
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, AppError> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} is not valid: {}", key, raw))),
        None => Ok(default),
    }
}
