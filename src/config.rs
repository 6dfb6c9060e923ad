//! Configuration module
//!
//! Settings come from a TOML file (default `~/.config/evpulse/config.toml`)
//! with every key optional. A handful of environment variables override the
//! file so containers can be configured without one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::infrastructure::ai::{AiConfig, DEFAULT_AI_API_URL};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::database::DatabaseConfig;
use crate::shared::errors::InfraError;

pub const CONFIG_PATH_ENV: &str = "EVPULSE_CONFIG";

/// `~/.config/evpulse/config.toml`, or `./config.toml` when the platform
/// has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("evpulse").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Path from `EVPULSE_CONFIG`, else the default.
pub fn config_path_from_env() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// `*` allows every origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl ServerSection {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let pool = DatabaseConfig::default();
        Self {
            url: pool.url,
            min_connections: pool.min_connections,
            max_connections: pool.max_connections,
            connect_timeout_secs: pool.connect_timeout.as_secs(),
            idle_timeout_secs: pool.idle_timeout.as_secs(),
            acquire_timeout_secs: pool.acquire_timeout.as_secs(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub jwt_issuer: String,
}

impl std::fmt::Debug for SecuritySection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecuritySection")
            .field("jwt_secret", &"***")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("jwt_issuer", &self.jwt_issuer)
            .finish()
    }
}

impl Default for SecuritySection {
    fn default() -> Self {
        let jwt = JwtConfig::default();
        Self {
            jwt_secret: jwt.secret,
            jwt_expiration_hours: 24,
            jwt_issuer: jwt.issuer,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `EnvFilter` directive, e.g. `info` or `evpulse=debug,tower_http=info`
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedSection {
    /// Create the default accounts when the users table is empty
    pub enabled: bool,
}

impl Default for SeedSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSection {
    pub api_key: Option<String>,
    pub api_url: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for AiSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiSection")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for AiSection {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_AI_API_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub security: SecuritySection,
    pub logging: LoggingSection,
    pub seed: SeedSection,
    pub ai: AiSection,
}

impl AppConfig {
    /// Read `path`; a missing file yields the defaults. Environment
    /// overrides are applied either way.
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path)?;
            Self::from_toml(&text)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, InfraError> {
        toml::from_str(text).map_err(|e| InfraError::Config(e.to_string()))
    }

    /// Apply `DATABASE_URL`, `JWT_SECRET_KEY`, `JWT_ACCESS_TOKEN_EXPIRES`
    /// (seconds), `AI_API_KEY` and `EVPULSE_PORT`. Unparseable numbers are
    /// logged and ignored.
    pub fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = url;
        }
        if let Some(secret) = var("JWT_SECRET_KEY").filter(|v| !v.is_empty()) {
            self.security.jwt_secret = secret;
        }
        if let Some(expires) = var("JWT_ACCESS_TOKEN_EXPIRES") {
            match expires.parse::<i64>() {
                Ok(secs) => self.security.jwt_expiration_hours = (secs / 3600).max(1),
                Err(_) => warn!(value = %expires, "Ignoring invalid JWT_ACCESS_TOKEN_EXPIRES"),
            }
        }
        if let Some(key) = var("AI_API_KEY").filter(|v| !v.is_empty()) {
            self.ai.api_key = Some(key);
        }
        if let Some(port) = var("EVPULSE_PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid EVPULSE_PORT"),
            }
        }
    }

    /// Every problem found, empty when the configuration is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let db = &self.database;
        if db.min_connections > db.max_connections {
            issues.push(format!(
                "database.min_connections ({}) is greater than database.max_connections ({})",
                db.min_connections, db.max_connections
            ));
        }
        if db.connect_timeout_secs == 0 {
            issues.push("database.connect_timeout_secs must be greater than 0".to_string());
        }
        if !(db.url.starts_with("sqlite:") || db.url.starts_with("postgres:")) {
            issues.push("database.url must start with sqlite: or postgres:".to_string());
        }
        if self.security.jwt_secret.trim().is_empty() {
            issues.push("security.jwt_secret must not be empty".to_string());
        }
        if self.security.jwt_expiration_hours <= 0 {
            issues.push("security.jwt_expiration_hours must be positive".to_string());
        }
        if !matches!(self.logging.format.to_lowercase().as_str(), "text" | "json") {
            issues.push(format!(
                "logging.format must be text or json, got {}",
                self.logging.format
            ));
        }
        issues
    }

    pub fn database_config(&self) -> DatabaseConfig {
        let db = &self.database;
        DatabaseConfig {
            url: db.url.clone(),
            min_connections: db.min_connections,
            max_connections: db.max_connections,
            connect_timeout: Duration::from_secs(db.connect_timeout_secs),
            idle_timeout: Duration::from_secs(db.idle_timeout_secs),
            acquire_timeout: Duration::from_secs(db.acquire_timeout_secs),
        }
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.security.jwt_secret.clone(),
            expiration_secs: self.security.jwt_expiration_hours * 3600,
            issuer: self.security.jwt_issuer.clone(),
        }
    }

    pub fn ai_config(&self) -> AiConfig {
        AiConfig {
            api_key: self.ai.api_key.clone().filter(|k| !k.trim().is_empty()),
            api_url: self.ai.api_url.clone(),
            timeout: Duration::from_secs(self.ai.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_keys_take_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            port = 8080

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.security.jwt_expiration_hours, 24);
        assert!(config.seed.enabled);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = AppConfig::from_toml("[server\nport = ").unwrap_err();
        assert!(matches!(err, InfraError::Config(_)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/evpulse/config.toml")).unwrap();
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn environment_overrides_the_file() {
        let env: HashMap<&str, &str> = [
            ("DATABASE_URL", "sqlite://./other.db?mode=rwc"),
            ("JWT_SECRET_KEY", "from-env"),
            ("JWT_ACCESS_TOKEN_EXPIRES", "7200"),
            ("AI_API_KEY", "k-123"),
            ("EVPULSE_PORT", "not-a-port"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.url, "sqlite://./other.db?mode=rwc");
        assert_eq!(config.security.jwt_secret, "from-env");
        assert_eq!(config.jwt_config().expiration_secs, 7200);
        assert_eq!(config.ai_config().api_key.as_deref(), Some("k-123"));
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn validate_reports_every_problem() {
        let mut config = AppConfig::default();
        config.database.min_connections = 20;
        config.database.connect_timeout_secs = 0;
        config.database.url = "mysql://localhost/evpulse".to_string();
        config.security.jwt_secret = "  ".to_string();

        let issues = config.validate();
        assert_eq!(issues.len(), 4, "{:?}", issues);
        assert!(issues[0].contains("min_connections"));
    }

    #[test]
    fn secrets_are_not_printed() {
        let mut config = AppConfig::default();
        config.security.jwt_secret = "topsecret".to_string();
        config.ai.api_key = Some("ai-key-4242".to_string());
        let printed = format!("{:?}", config);
        assert!(!printed.contains("topsecret"));
        assert!(!printed.contains("ai-key-4242"));
    }
}
