use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Longest accepted token lifetime (one year)
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 366;

/// Signing secret used when none is configured. Refused in production.
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub storage: StorageBackend,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Where users and groups live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StorageBackend::Postgres),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// How long in-flight requests may run once shutdown starts
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub default_search_limit: usize,
    pub max_search_limit: usize,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// Account ensured at startup so a fresh store can be logged into
    pub bootstrap_user: Option<BootstrapUser>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct BootstrapUser {
    pub login: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl std::fmt::Debug for BootstrapUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapUser")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SECURITY_JWT_SECRET must be set in {0:?}")]
    InsecureJwtSecret(Environment),

    #[error("JWT secret cannot be empty")]
    EmptyJwtSecret,

    #[error("API_DEFAULT_SEARCH_LIMIT ({default}) exceeds API_MAX_SEARCH_LIMIT ({max})")]
    SearchLimits { default: usize, max: usize },

    #[error("SECURITY_JWT_EXPIRY_HOURS must be between 1 and {max}, got {hours}")]
    JwtExpiry { hours: u64, max: u64 },
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
        if let Some(v) = env::var("APP_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SERVER_SHUTDOWN_GRACE_SECS") {
            self.server.shutdown_grace_secs = v.parse().unwrap_or(self.server.shutdown_grace_secs);
        }
        if let Ok(v) = env::var("APP_STORAGE") {
            self.storage = v.parse().unwrap_or(self.storage);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|url| !url.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("API_DEFAULT_SEARCH_LIMIT") {
            self.api.default_search_limit = v.parse().unwrap_or(self.api.default_search_limit);
        }
        if let Ok(v) = env::var("API_MAX_SEARCH_LIMIT") {
            self.api.max_search_limit = v.parse().unwrap_or(self.api.max_search_limit);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Some(user) = bootstrap_from_env(env::var("BOOTSTRAP_LOGIN").ok(), env::var("BOOTSTRAP_PASSWORD").ok()) {
            self.security.bootstrap_user = Some(user);
        }

        self
    }

    /// Reject combinations the server must not start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::EmptyJwtSecret);
        }
        if self.environment != Environment::Development && self.security.jwt_secret == DEV_JWT_SECRET {
            return Err(ConfigError::InsecureJwtSecret(self.environment));
        }
        let hours = self.security.jwt_expiry_hours;
        if hours == 0 || hours > MAX_JWT_EXPIRY_HOURS {
            return Err(ConfigError::JwtExpiry {
                hours,
                max: MAX_JWT_EXPIRY_HOURS,
            });
        }
        if self.api.default_search_limit > self.api.max_search_limit {
            return Err(ConfigError::SearchLimits {
                default: self.api.default_search_limit,
                max: self.api.max_search_limit,
            });
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 8080,
                shutdown_grace_secs: 5,
            },
            storage: StorageBackend::Postgres,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                default_search_limit: 10,
                max_search_limit: 1000,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
                jwt_secret: DEV_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                bootstrap_user: None,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 8080,
                shutdown_grace_secs: 15,
            },
            storage: StorageBackend::Postgres,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                default_search_limit: 10,
                max_search_limit: 500,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: DEV_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24,
                bootstrap_user: None,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 8080,
                shutdown_grace_secs: 30,
            },
            storage: StorageBackend::Postgres,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                default_search_limit: 10,
                max_search_limit: 100,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: DEV_JWT_SECRET.to_string(),
                jwt_expiry_hours: 4,
                bootstrap_user: None,
            },
        }
    }
}

/// Both variables are needed; a lone one is reported and ignored
fn bootstrap_from_env(login: Option<String>, password: Option<String>) -> Option<BootstrapUser> {
    match (login, password) {
        (Some(login), Some(password)) => Some(BootstrapUser { login, password }),
        (Some(_), None) => {
            tracing::warn!("BOOTSTRAP_LOGIN is set without BOOTSTRAP_PASSWORD; no bootstrap user will be created");
            None
        }
        (None, Some(_)) => {
            tracing::warn!("BOOTSTRAP_PASSWORD is set without BOOTSTRAP_LOGIN; no bootstrap user will be created");
            None
        }
        (None, None) => None,
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
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_rejects_dev_secret() {
        let config = AppConfig::production();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InsecureJwtSecret(Environment::Production))
        ));

        let mut config = AppConfig::production();
        config.security.jwt_secret = "a-real-secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_search_limits_must_be_ordered() {
        let mut config = AppConfig::development();
        config.api.default_search_limit = config.api.max_search_limit + 1;
        assert!(matches!(config.validate(), Err(ConfigError::SearchLimits { .. })));
    }

    #[test]
    fn test_jwt_expiry_must_be_bounded() {
        let mut config = AppConfig::development();
        config.security.jwt_expiry_hours = 10_000_000_000;
        assert!(matches!(config.validate(), Err(ConfigError::JwtExpiry { .. })));

        config.security.jwt_expiry_hours = 0;
        assert!(matches!(config.validate(), Err(ConfigError::JwtExpiry { .. })));

        config.security.jwt_expiry_hours = MAX_JWT_EXPIRY_HOURS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bootstrap_user_needs_both_variables() {
        let user = bootstrap_from_env(Some("root".to_string()), Some("rootpass1".to_string()));
        assert_eq!(user.map(|u| u.login), Some("root".to_string()));

        assert!(bootstrap_from_env(Some("root".to_string()), None).is_none());
        assert!(bootstrap_from_env(None, Some("rootpass1".to_string())).is_none());
        assert!(bootstrap_from_env(None, None).is_none());
    }

    #[test]
    fn test_storage_backend_parsing() {
        assert_eq!("memory".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert_eq!("PostgreSQL".parse::<StorageBackend>(), Ok(StorageBackend::Postgres));
        assert!("redis".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_secrets_are_not_serialized() {
        let mut config = AppConfig::development();
        config.security.bootstrap_user = Some(BootstrapUser {
            login: "root".to_string(),
            password: "hunter22".to_string(),
        });

        let value = serde_json::to_value(&config).unwrap();
        assert!(value["security"].get("jwt_secret").is_none());
        assert_eq!(value["security"]["bootstrap_user"]["login"], "root");
        assert!(value["security"]["bootstrap_user"].get("password").is_none());
        assert!(!format!("{:?}", config).contains("hunter22"));
    }
}
