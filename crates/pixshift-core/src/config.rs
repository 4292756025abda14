//! Configuration module
//!
//! Server, limit and conversion defaults, loaded from the environment
//! (optionally through a `.env` file).

use std::env;
use std::str::FromStr;

const SERVER_PORT: u16 = 5000;
const MAX_FILE_SIZE_MB: usize = 16;
const MAX_REQUEST_SIZE_MB: usize = 64;
const MAX_FILES_PER_REQUEST: usize = 50;
const DEFAULT_QUALITY: u8 = 85;
const PREVIEW_MAX_DIMENSION: u32 = 400;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Log output format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!("Invalid LOG_FORMAT: {}", other)),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub max_file_size_bytes: usize,
    pub max_request_size_bytes: usize,
    pub max_files_per_request: usize,
    pub default_quality: u8,
    pub preview_max_dimension: u32,
    pub log_format: LogFormat,
    pub http_concurrency_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            max_request_size_bytes: MAX_REQUEST_SIZE_MB * 1024 * 1024,
            max_files_per_request: MAX_FILES_PER_REQUEST,
            default_quality: DEFAULT_QUALITY,
            preview_max_dimension: PREVIEW_MAX_DIMENSION,
            log_format: LogFormat::Text,
            http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
        }
    }
}

/// Parse an environment variable, falling back to `default` when unset or unparsable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let log_format = match env::var("LOG_FORMAT") {
            Ok(value) => value.parse::<LogFormat>()?,
            Err(_) => LogFormat::Text,
        };

        let max_file_size_mb = env_or("MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB);
        let max_request_size_mb = env_or("MAX_REQUEST_SIZE_MB", MAX_REQUEST_SIZE_MB);

        let config = Config {
            server_port: env_or("SERVER_PORT", SERVER_PORT),
            environment,
            cors_origins,
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            max_request_size_bytes: max_request_size_mb * 1024 * 1024,
            max_files_per_request: env_or("MAX_FILES_PER_REQUEST", MAX_FILES_PER_REQUEST),
            default_quality: env_or("DEFAULT_QUALITY", DEFAULT_QUALITY),
            preview_max_dimension: env_or("PREVIEW_MAX_DIMENSION", PREVIEW_MAX_DIMENSION),
            log_format,
            http_concurrency_limit: env_or("HTTP_CONCURRENCY_LIMIT", HTTP_CONCURRENCY_LIMIT)
                .max(1),
        };

        config.validate()?;
        Ok(config)
    }

    /// Fail fast on misconfiguration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.cors_origins.is_empty() {
            return Err(anyhow::anyhow!("CORS_ORIGINS must not be empty"));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.max_request_size_bytes < self.max_file_size_bytes {
            return Err(anyhow::anyhow!(
                "MAX_REQUEST_SIZE_MB must be at least MAX_FILE_SIZE_MB"
            ));
        }

        if self.max_files_per_request == 0 {
            return Err(anyhow::anyhow!(
                "MAX_FILES_PER_REQUEST must be greater than 0"
            ));
        }

        if !(1..=100).contains(&self.default_quality) {
            return Err(anyhow::anyhow!("DEFAULT_QUALITY must be between 1 and 100"));
        }

        if self.preview_max_dimension == 0 {
            return Err(anyhow::anyhow!(
                "PREVIEW_MAX_DIMENSION must be greater than 0"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server_port, 5000);
        assert_eq!(config.default_quality, 85);
        assert_eq!(config.max_file_size_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let config = Config {
            environment: "Production".to_string(),
            ..Config::default()
        };
        assert!(config.is_production());
        assert!(config.validate().is_err());

        let config = Config {
            environment: "prod".to_string(),
            cors_origins: vec!["https://convert.example.com".to_string()],
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_request_limit_must_cover_file_limit() {
        let config = Config {
            max_file_size_bytes: 10 * 1024 * 1024,
            max_request_size_bytes: 1024 * 1024,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_quality_bounds() {
        let config = Config {
            default_quality: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            default_quality: 100,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
