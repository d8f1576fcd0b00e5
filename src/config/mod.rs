use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub filter: FilterConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub debug_logging: bool,
    /// Translation re-fetches returning more rows than this are logged at warn level
    pub refetch_warn_threshold: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

/// Hard ceiling for `per_page`, whatever the environment says
pub const PER_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub default_per_page: u32,
    pub max_per_page: u32,
    pub enable_request_logging: bool,
}

impl ApiConfig {
    /// Keep `max_per_page` in 1..=100 and `default_per_page` in 1..=max
    pub fn clamp_paging(&mut self) {
        self.max_per_page = self.max_per_page.clamp(1, PER_PAGE_LIMIT);
        self.default_per_page = self.default_per_page.clamp(1, self.max_per_page);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_expiry_minutes: i64,
    /// bcrypt work factor for new password hashes
    pub password_cost: u32,
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
        // Filter overrides
        if let Ok(v) = env::var("FILTER_DEBUG_LOGGING") {
            self.filter.debug_logging = v.parse().unwrap_or(self.filter.debug_logging);
        }
        if let Ok(v) = env::var("FILTER_REFETCH_WARN_THRESHOLD") {
            self.filter.refetch_warn_threshold = v.parse().unwrap_or(self.filter.refetch_warn_threshold);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Some(port) = env::var("API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_DEFAULT_PER_PAGE") {
            self.api.default_per_page = v.parse().unwrap_or(self.api.default_per_page);
        }
        if let Ok(v) = env::var("API_MAX_PER_PAGE") {
            self.api.max_per_page = v.parse().unwrap_or(self.api.max_per_page);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        self.api.clamp_paging();

        // Security overrides
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_MINUTES") {
            self.security.jwt_expiry_minutes = v.parse().unwrap_or(self.security.jwt_expiry_minutes);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.password_cost = v.parse().unwrap_or(self.security.password_cost);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            filter: FilterConfig {
                debug_logging: true,
                refetch_warn_threshold: 1_000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                port: 8000,
                default_per_page: 20,
                max_per_page: 100,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                    "http://localhost:8080".to_string(),
                ],
                jwt_secret: "dev-secret-change-in-production".to_string(),
                jwt_expiry_minutes: 24 * 60,
                // Cheap hashes keep local runs and tests fast
                password_cost: 4, // bcrypt minimum cost (bcrypt::MIN_COST is private)
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            filter: FilterConfig {
                debug_logging: false,
                refetch_warn_threshold: 1_000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            api: ApiConfig {
                port: 8000,
                default_per_page: 20,
                max_per_page: 100,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_minutes: 24 * 60,
                password_cost: bcrypt::DEFAULT_COST,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            filter: FilterConfig {
                debug_logging: false,
                refetch_warn_threshold: 5_000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                port: 8000,
                default_per_page: 20,
                max_per_page: 100,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
                // Must come from JWT_SECRET; token issuance fails while empty
                jwt_secret: String::new(),
                jwt_expiry_minutes: 4 * 60,
                password_cost: bcrypt::DEFAULT_COST,
            },
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.filter.debug_logging);
        assert_eq!(config.api.default_per_page, 20);
        assert_eq!(config.api.max_per_page, 100);
        assert!(!config.security.jwt_secret.is_empty());
        assert!(config.is_development());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.filter.debug_logging);
        assert!(!config.database.run_migrations);
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.security.jwt_expiry_minutes, 240);
        assert_eq!(config.security.password_cost, bcrypt::DEFAULT_COST);
    }

    #[test]
    fn paging_overrides_are_clamped() {
        let mut api = AppConfig::development().api;
        api.max_per_page = 500;
        api.default_per_page = 0;
        api.clamp_paging();
        assert_eq!(api.max_per_page, 100);
        assert_eq!(api.default_per_page, 1);

        api.max_per_page = 10;
        api.default_per_page = 20;
        api.clamp_paging();
        assert_eq!(api.max_per_page, 10);
        assert_eq!(api.default_per_page, 10);

        api.max_per_page = 0;
        api.clamp_paging();
        assert_eq!(api.max_per_page, 1);
        assert_eq!(api.default_per_page, 1);
    }
}
