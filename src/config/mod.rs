use std::env;
use std::path::PathBuf;

/// Application configuration, built once in `main` from the environment and
/// threaded through the router state. Nothing here is a global.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string; without one the in-process memory backend
    /// is used.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for uploaded repair attachments.
    pub root: PathBuf,
    /// Base URL that public file URLs are built from.
    pub base_url: String,
    /// Directory holding the printable document templates.
    pub templates_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// Seed the admin/admin development account at startup.
    pub seed_dev_admin: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("WORKSHOP_PORT").or_else(|_| env::var("PORT")) {
            if let Ok(port) = v.parse() {
                self.server.port = port;
            }
        }

        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }

        if let Ok(v) = env::var("WORKSHOP_UPLOAD_DIR") {
            self.storage.root = PathBuf::from(v);
        }
        if let Ok(v) = env::var("WORKSHOP_BASE_URL") {
            self.storage.base_url = v;
        }
        if let Ok(v) = env::var("WORKSHOP_TEMPLATES_DIR") {
            self.storage.templates_dir = PathBuf::from(v);
        }

        if let Ok(v) = env::var("WORKSHOP_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("WORKSHOP_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("WORKSHOP_SEED_ADMIN") {
            self.security.seed_dev_admin = v.parse().unwrap_or(self.security.seed_dev_admin);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
            },
            storage: StorageConfig {
                root: PathBuf::from("upload-dir"),
                base_url: "http://localhost:8080/".to_string(),
                templates_dir: PathBuf::from("templates/documents"),
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret-change-me".to_string(),
                jwt_expiry_hours: 24,
                seed_dev_admin: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
            },
            storage: StorageConfig {
                root: PathBuf::from("upload-dir"),
                base_url: "http://localhost:8080/".to_string(),
                templates_dir: PathBuf::from("templates/documents"),
            },
            security: SecurityConfig {
                // must be provided via WORKSHOP_JWT_SECRET
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                seed_dev_admin: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults_allow_local_use() {
        let config = AppConfig::development();
        assert!(config.security.seed_dev_admin);
        assert!(!config.security.jwt_secret.is_empty());
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn production_defaults_require_an_explicit_secret() {
        let config = AppConfig::production();
        assert!(!config.security.seed_dev_admin);
        assert!(config.security.jwt_secret.is_empty());
    }
}
