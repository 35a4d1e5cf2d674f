use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::inquiries::service::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the inquiry desk.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub inquiries: InquiryConfig,
    pub cors: CorsConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8001".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let list_limit = match non_blank_var("INQUIRY_LIST_LIMIT") {
            Some(raw) => parse_list_limit(&raw)?,
            None => DEFAULT_LIST_LIMIT,
        };

        let inquiries = InquiryConfig {
            data_path: non_blank_var("INQUIRY_DATA_PATH").map(PathBuf::from),
            admin_token: non_blank_var("INQUIRY_ADMIN_TOKEN"),
            list_limit,
            staff_email: non_blank_var("NOTIFY_STAFF_EMAIL"),
        };

        let cors = CorsConfig {
            allowed_origins: AllowedOrigins::parse(
                non_blank_var("CORS_ALLOWED_ORIGINS").as_deref(),
            ),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            inquiries,
            cors,
        })
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_list_limit(raw: &str) -> Result<usize, ConfigError> {
    match raw.parse::<usize>() {
        Ok(limit) if (1..=MAX_LIST_LIMIT).contains(&limit) => Ok(limit),
        _ => Err(ConfigError::InvalidListLimit {
            value: raw.to_string(),
        }),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Storage, access, and notification settings for the inquiry workflow.
#[derive(Clone)]
pub struct InquiryConfig {
    /// JSON file backing the store; `None` keeps inquiries in memory only.
    pub data_path: Option<PathBuf>,
    /// Bearer token protecting the dashboard routes; `None` leaves them open.
    pub admin_token: Option<String>,
    pub list_limit: usize,
    pub staff_email: Option<String>,
}

impl fmt::Debug for InquiryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InquiryConfig")
            .field("data_path", &self.data_path)
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<redacted>"))
            .field("list_limit", &self.list_limit)
            .field("staff_email", &self.staff_email)
            .finish()
    }
}

/// Browser origins allowed to call the API.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: AllowedOrigins,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

impl AllowedOrigins {
    fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Any;
        };

        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
            Self::Any
        } else {
            Self::List(origins)
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidListLimit { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidListLimit { value } => write!(
                f,
                "INQUIRY_LIST_LIMIT must be between 1 and {MAX_LIST_LIMIT} (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidListLimit { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
