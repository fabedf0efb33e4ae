//! Application configuration loaded once from the process environment

use anyhow::{Result, bail};
use serde::Deserialize;

use auth::jwt::MIN_SECRET_LEN;

/// Application configuration
///
/// # Environment Variables
/// - `PORT`: listening port (default: 8080)
/// - `SUPABASE_URL`: base URL of the hosted project (required)
/// - `SUPABASE_ANON_KEY`: API key of the hosted project (required)
/// - `JWT_SECRET`: session token secret, at least 32 characters (required)
/// - `ALLOWED_ORIGINS`: comma separated CORS origins (default: http://localhost:3000)
/// - `ENVIRONMENT`: `development` or `production` (default: production)
/// - `PESU_AUTH_URL`: identity provider base URL (default: https://pesu-auth.onrender.com)
/// - `RATE_LIMIT_MAX` / `RATE_LIMIT_WINDOW`: general budget (default: 100 per 3600 s)
/// - `AUTH_RATE_LIMIT_MAX` / `AUTH_RATE_LIMIT_WINDOW`: login budget (default: 3 per 900 s)
/// - `DATA_SERVICE_TIMEOUT`: data service timeout in seconds (default: 15)
/// - `STORAGE_BUCKET`: image bucket (default: item-images)
/// - `STORAGE_REGION`: region sent to the storage endpoint (default: us-east-1)
/// - `STORAGE_ENDPOINT`: S3-compatible endpoint (default: derived from `SUPABASE_URL`)
/// - `STORAGE_ACCESS_KEY_ID` / `STORAGE_SECRET_ACCESS_KEY`: static storage credentials
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub supabase_url: String,
    #[serde(default)]
    pub supabase_anon_key: String,
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_pesu_auth_url")]
    pub pesu_auth_url: String,
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window: u64,
    #[serde(default = "default_auth_rate_limit_max")]
    pub auth_rate_limit_max: u32,
    #[serde(default = "default_auth_rate_limit_window")]
    pub auth_rate_limit_window: u64,
    #[serde(default = "default_data_service_timeout")]
    pub data_service_timeout: u64,
    #[serde(default = "default_storage_bucket")]
    pub storage_bucket: String,
    #[serde(default = "default_storage_region")]
    pub storage_region: String,
    pub storage_endpoint: Option<String>,
    pub storage_access_key_id: Option<String>,
    pub storage_secret_access_key: Option<String>,
}

fn default_port() -> u16 {
    8080
}

fn default_allowed_origins() -> String {
    "http://localhost:3000".to_string()
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_pesu_auth_url() -> String {
    "https://pesu-auth.onrender.com".to_string()
}

fn default_rate_limit_max() -> u32 {
    100
}

fn default_rate_limit_window() -> u64 {
    3600
}

fn default_auth_rate_limit_max() -> u32 {
    3
}

fn default_auth_rate_limit_window() -> u64 {
    900
}

fn default_data_service_timeout() -> u64 {
    15
}

fn default_storage_bucket() -> String {
    "item-images".to_string()
}

fn default_storage_region() -> String {
    "us-east-1".to_string()
}

impl AppConfig {
    /// Load and validate the configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config: AppConfig = config::Config::builder()
            .add_source(config::Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.jwt_secret.is_empty() {
            bail!("JWT_SECRET environment variable is required");
        }
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LEN);
        }
        if self.supabase_url.is_empty() || self.supabase_anon_key.is_empty() {
            bail!("SUPABASE_URL and SUPABASE_ANON_KEY environment variables are required");
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Configured CORS origins, trimmed, empty entries dropped
    pub fn allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}
