use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub access_token_expiry_hours: u64,
    pub refresh_token_expiry_days: u64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: String,
    pub max_upload_bytes: usize,
    pub preview_rows: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs =
                v.parse().unwrap_or(self.database.connection_timeout_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_ACCESS_TOKEN_EXPIRY_HOURS") {
            self.security.access_token_expiry_hours =
                v.parse().unwrap_or(self.security.access_token_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_REFRESH_TOKEN_EXPIRY_DAYS") {
            self.security.refresh_token_expiry_days =
                v.parse().unwrap_or(self.security.refresh_token_expiry_days);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.uploads.dir = v;
        }
        if let Ok(v) = env::var("UPLOAD_MAX_BYTES") {
            self.uploads.max_upload_bytes = v.parse().unwrap_or(self.uploads.max_upload_bytes);
        }
        if let Ok(v) = env::var("UPLOAD_PREVIEW_ROWS") {
            self.uploads.preview_rows = v.parse().unwrap_or(self.uploads.preview_rows);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            security: SecurityConfig {
                // Dev-only fallback; real deployments must set JWT_SECRET
                jwt_secret: "scout-dev-secret".to_string(),
                access_token_expiry_hours: 24,
                refresh_token_expiry_days: 7,
                cors_origins: vec![
                    "http://localhost:8080".to_string(),
                    "http://127.0.0.1:8080".to_string(),
                    "http://localhost:8081".to_string(),
                    "http://127.0.0.1:8081".to_string(),
                ],
            },
            uploads: UploadConfig {
                dir: "uploads".to_string(),
                max_upload_bytes: 10 * 1024 * 1024, // 10MB
                preview_rows: 10,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout_secs: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_expiry_hours: 12,
                refresh_token_expiry_days: 7,
                cors_origins: vec!["https://staging.scout.example.com".to_string()],
            },
            uploads: UploadConfig {
                dir: "uploads".to_string(),
                max_upload_bytes: 5 * 1024 * 1024, // 5MB
                preview_rows: 10,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout_secs: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_expiry_hours: 4,
                refresh_token_expiry_days: 7,
                cors_origins: vec!["https://app.scout.example.com".to_string()],
            },
            uploads: UploadConfig {
                dir: "uploads".to_string(),
                max_upload_bytes: 2 * 1024 * 1024, // 2MB
                preview_rows: 10,
            },
        }
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
        assert_eq!(config.uploads.preview_rows, 10);
        assert!(!config.security.jwt_secret.is_empty());
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.uploads.max_upload_bytes, 2 * 1024 * 1024);
    }
}
