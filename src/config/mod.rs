use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
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
pub struct DatabaseConfig {
    pub url: String,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub token_secret: String,
    pub token_expiry_hours: u64,
    pub cors_origins: Vec<String>,
    pub cookie_secure: bool,
    pub protect_mutations: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Token expiry of {0} hours is out of range")]
    InvalidTokenExpiry(u64),
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup (environment, map in tests).
    pub fn from_source<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(lookup)
    }

    fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("DB_USER") {
            self.database.user = Some(v);
        }
        if let Some(v) = lookup("DB_PASS") {
            self.database.password = Some(v);
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Some(v) = lookup("ACCESS_TOKEN_SECRET") {
            self.security.token_secret = v;
        }
        if let Some(v) = lookup("SECURITY_TOKEN_EXPIRY_HOURS") {
            self.security.token_expiry_hours = v.parse().unwrap_or(self.security.token_expiry_hours);
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = lookup("SECURITY_COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }
        if let Some(v) = lookup("SECURITY_PROTECT_MUTATIONS") {
            self.security.protect_mutations = v.parse().unwrap_or(self.security.protect_mutations);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: "postgres://localhost:5432/car_genius".to_string(),
                user: None,
                password: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                token_secret: String::new(),
                token_expiry_hours: 10,
                cors_origins: vec!["http://localhost:5173".to_string()],
                cookie_secure: true,
                protect_mutations: false,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: "postgres://localhost:5432/car_genius".to_string(),
                user: None,
                password: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                token_secret: String::new(),
                token_expiry_hours: 10,
                cors_origins: vec!["https://staging.car-genius.app".to_string()],
                cookie_secure: true,
                protect_mutations: false,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: "postgres://localhost:5432/car_genius".to_string(),
                user: None,
                password: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                token_secret: String::new(),
                token_expiry_hours: 10,
                cors_origins: vec!["https://car-genius.app".to_string()],
                cookie_secure: true,
                protect_mutations: false,
            },
        }
    }
}

impl SecurityConfig {
    /// Credential lifetime, rejecting hour counts chrono cannot represent.
    pub fn token_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        i64::try_from(self.token_expiry_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .ok_or(ConfigError::InvalidTokenExpiry(self.token_expiry_hours))
    }
}

impl DatabaseConfig {
    /// Store URL with `DB_USER` / `DB_PASS` embedded as URL credentials.
    pub fn connection_string(&self) -> Result<String, ConfigError> {
        if self.user.is_none() && self.password.is_none() {
            return Ok(self.url.clone());
        }

        let mut url = url::Url::parse(&self.url)
            .map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()))?;

        if let Some(user) = &self.user {
            url.set_username(user)
                .map_err(|_| ConfigError::InvalidDatabaseUrl(self.url.clone()))?;
        }
        if let Some(password) = &self.password {
            url.set_password(Some(password))
                .map_err(|_| ConfigError::InvalidDatabaseUrl(self.url.clone()))?;
        }
        Ok(url.into())
    }
}
