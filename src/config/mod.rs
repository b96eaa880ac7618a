use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::auth::{Role, UserAccount};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub pagination: PaginationConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
    pub render: RenderConfig,
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// When unset the service runs against the in-process store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
    pub users: Vec<UserAccount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub render_dir: PathBuf,
    pub public_base_url: String,
    /// Largest accepted logo upload
    pub max_logo_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub service_url: Option<String>,
    pub timeout_secs: u64,
    pub max_dimension: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
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
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Pagination overrides
        if let Ok(v) = env::var("PAGINATION_DEFAULT_LIMIT") {
            self.pagination.default_limit = v.parse().unwrap_or(self.pagination.default_limit);
        }
        if let Ok(v) = env::var("PAGINATION_MAX_LIMIT") {
            self.pagination.max_limit = v.parse().unwrap_or(self.pagination.max_limit);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Ok(v) = env::var("AUTH_USERS") {
            self.security.users = parse_user_list(&v);
        }

        // Storage overrides
        if let Ok(v) = env::var("RENDER_DIR") {
            self.storage.render_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("PUBLIC_BASE_URL") {
            self.storage.public_base_url = v;
        }
        if let Ok(v) = env::var("MAX_LOGO_BYTES") {
            self.storage.max_logo_bytes = v.parse().unwrap_or(self.storage.max_logo_bytes);
        }

        // Render overrides
        if let Ok(v) = env::var("RENDER_SERVICE_URL") {
            self.render.service_url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("RENDER_TIMEOUT_SECS") {
            self.render.timeout_secs = v.parse().unwrap_or(self.render.timeout_secs);
        }

        // AI overrides
        if let Ok(v) = env::var("OPENAI_API_KEY") {
            self.ai.api_key = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("OPENAI_BASE_URL") {
            self.ai.base_url = v;
        }
        if let Ok(v) = env::var("OPENAI_MODEL") {
            self.ai.model = v;
        }
        if let Ok(v) = env::var("OPENAI_TEMPERATURE") {
            self.ai.temperature = v.parse().unwrap_or(self.ai.temperature);
        }
        if let Ok(v) = env::var("AI_TIMEOUT_SECS") {
            self.ai.timeout_secs = v.parse().unwrap_or(self.ai.timeout_secs);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            pagination: PaginationConfig {
                default_limit: 10,
                max_limit: 100,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: "development-secret-change-me".to_string(),
                jwt_expiry_hours: 24,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                users: vec![
                    UserAccount::with_password(1, "admin", "admin123", Role::Admin),
                    UserAccount::with_password(2, "user", "user123", Role::User),
                ],
            },
            storage: StorageConfig {
                render_dir: PathBuf::from("public/renders"),
                public_base_url: "http://localhost:3000".to_string(),
                max_logo_bytes: 2 * 1024 * 1024,
            },
            render: RenderConfig {
                service_url: None,
                timeout_secs: 30,
                max_dimension: 4000,
            },
            ai: AiConfig {
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-3.5-turbo".to_string(),
                temperature: 0.8,
                timeout_secs: 15,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.jwt_secret = String::new();
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config.security.users = vec![];
        config.storage.public_base_url = "https://staging.example.com".to_string();
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.security.jwt_secret = String::new();
        config.security.jwt_expiry_hours = 4;
        config.security.cors_origins = vec!["https://app.example.com".to_string()];
        config.security.users = vec![];
        config.storage.public_base_url = "https://app.example.com".to_string();
        config.render.timeout_secs = 20;
        config.ai.timeout_secs = 10;
        config
    }
}

/// Parse `name:sha256hex:role` triples separated by commas. Ids are assigned
/// in list order starting at 1.
fn parse_user_list(raw: &str) -> Vec<UserAccount> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .filter_map(|(index, entry)| {
            let mut parts = entry.splitn(3, ':');
            let username = parts.next()?.trim();
            let password_sha256 = parts.next()?.trim();
            let role = match parts.next().map(str::trim) {
                Some("admin") => Role::Admin,
                _ => Role::User,
            };
            if username.is_empty() || password_sha256.is_empty() {
                tracing::warn!("Ignoring malformed AUTH_USERS entry at position {}", index);
                return None;
            }
            Some(UserAccount {
                id: index as i64 + 1,
                username: username.to_string(),
                password_sha256: password_sha256.to_ascii_lowercase(),
                role,
            })
        })
        .collect()
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
        assert_eq!(config.pagination.default_limit, 10);
        assert_eq!(config.pagination.max_limit, 100);
        assert!(config.database.url.is_none());
        assert_eq!(config.security.users.len(), 2);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.environment, Environment::Production);
        assert!(config.security.jwt_secret.is_empty());
        assert!(config.security.users.is_empty());
    }

    #[test]
    fn parses_user_list_entries() {
        let users = parse_user_list("root:ABCDEF:admin, guest:123456 ,broken");
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "root");
        assert_eq!(users[0].password_sha256, "abcdef");
        assert_eq!(users[0].role, Role::Admin);
        assert_eq!(users[1].id, 2);
        assert_eq!(users[1].role, Role::User);
    }
}
