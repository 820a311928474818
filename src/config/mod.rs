use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Secret used when no JWT_SECRET is configured outside production.
pub const DEVELOPMENT_JWT_SECRET: &str = "skillmarket-development-secret";

/// Upper bound on token lifetime (one year).
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub files: FileConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub upload_dir: PathBuf,
    pub public_dir: PathBuf,
    pub reference_data_path: Option<PathBuf>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in {0:?}")]
    MissingJwtSecret(Environment),

    #[error("DATABASE_URL must be set for the postgres storage backend")]
    MissingDatabaseUrl,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("SKILLMARKET_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }

        // Database overrides
        self.database.url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        self.database.backend = resolve_backend(
            env::var("STORAGE_BACKEND").ok().as_deref(),
            self.database.url.is_some(),
            self.database.backend,
        );
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = parse_expiry_hours(&v, self.security.jwt_expiry_hours);
        }

        // File overrides
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.files.upload_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("PUBLIC_DIR") {
            self.files.public_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("REFERENCE_DATA_PATH") {
            self.files.reference_data_path = Some(PathBuf::from(v)).filter(|p| !p.as_os_str().is_empty());
        }

        self
    }

    /// Check settings that cannot be defaulted. Development gets a fixed
    /// secret when none is configured; every other profile must provide one.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            if self.environment != Environment::Development {
                return Err(ConfigError::MissingJwtSecret(self.environment));
            }
            tracing::warn!("JWT_SECRET not set, using the development secret");
            self.security.jwt_secret = DEVELOPMENT_JWT_SECRET.to_string();
        }
        if self.database.backend == StorageBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 5000,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            database: DatabaseConfig {
                backend: StorageBackend::Memory,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:5000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            files: FileConfig::default(),
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 5000,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
            files: FileConfig::default(),
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 5000,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
            },
            files: FileConfig::default(),
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            public_dir: PathBuf::from("public"),
            reference_data_path: None,
        }
    }
}

/// An explicit STORAGE_BACKEND wins; otherwise postgres is used whenever a
/// database URL is available, and the profile default applies last.
pub fn resolve_backend(
    requested: Option<&str>,
    has_database_url: bool,
    profile_default: StorageBackend,
) -> StorageBackend {
    match requested.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("memory") | Some("mem") => StorageBackend::Memory,
        Some("postgres") | Some("pg") => StorageBackend::Postgres,
        _ if has_database_url => StorageBackend::Postgres,
        _ => profile_default,
    }
}

/// Unparseable values keep `current`; values above the bound are clamped.
pub fn parse_expiry_hours(raw: &str, current: u64) -> u64 {
    match raw.trim().parse::<u64>() {
        Ok(hours) if hours > MAX_JWT_EXPIRY_HOURS => {
            tracing::warn!(
                "SECURITY_JWT_EXPIRY_HOURS={} exceeds {}, clamping",
                hours,
                MAX_JWT_EXPIRY_HOURS
            );
            MAX_JWT_EXPIRY_HOURS
        }
        Ok(hours) => hours,
        Err(_) => current,
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.database.backend, StorageBackend::Memory);
        assert_eq!(config.security.jwt_expiry_hours, 24 * 7);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.database.backend, StorageBackend::Postgres);
        assert_eq!(config.security.jwt_expiry_hours, 4);
    }

    #[test]
    fn development_falls_back_to_dev_secret() {
        let mut config = AppConfig::development();
        config.validate().unwrap();
        assert_eq!(config.security.jwt_secret, DEVELOPMENT_JWT_SECRET);
    }

    #[test]
    fn production_requires_secret_and_database() {
        let mut config = AppConfig::production();
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingJwtSecret(Environment::Production))
        );

        config.security.jwt_secret = "s3cret".to_string();
        assert_eq!(config.validate(), Err(ConfigError::MissingDatabaseUrl));

        config.database.url = Some("postgres://localhost/skillmarket".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn expiry_hours_are_bounded() {
        assert_eq!(parse_expiry_hours("12", 4), 12);
        assert_eq!(parse_expiry_hours("soon", 4), 4);
        assert_eq!(parse_expiry_hours("-1", 4), 4);
        assert_eq!(parse_expiry_hours("18446744073709551615", 4), MAX_JWT_EXPIRY_HOURS);
        assert_eq!(parse_expiry_hours("9223372036854775808", 4), MAX_JWT_EXPIRY_HOURS);
    }

    #[test]
    fn backend_resolution() {
        use StorageBackend::*;
        assert_eq!(resolve_backend(None, false, Memory), Memory);
        assert_eq!(resolve_backend(None, true, Memory), Postgres);
        assert_eq!(resolve_backend(None, false, Postgres), Postgres);
        assert_eq!(resolve_backend(Some("memory"), true, Postgres), Memory);
        assert_eq!(resolve_backend(Some("Postgres"), false, Memory), Postgres);
        assert_eq!(resolve_backend(Some("bogus"), false, Memory), Memory);
    }
}
