use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;

use crate::ai::vendor::VendorKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub genai: GenAiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

/// Settings for the external text-generation vendor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenAiConfig {
    pub provider: VendorKind,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub model: Option<String>,
    /// Extra request headers, decoded from the JSON object in `GENAI_API_HEADERS`.
    pub extra_headers: BTreeMap<String, String>,
    pub timeout_secs: u64,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            provider: VendorKind::ChatCompletion,
            api_key: None,
            api_url: None,
            model: None,
            extra_headers: BTreeMap::new(),
            timeout_secs: 30,
        }
    }
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
        if let Ok(v) = env::var("BIND_ADDR") {
            self.server.bind_addr = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = non_empty(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            match parse_expiry_hours(&v) {
                Some(hours) => self.security.jwt_expiry_hours = hours,
                None => tracing::warn!(
                    "Ignoring JWT_EXPIRY_HOURS={:?}, expected 1..={}",
                    v,
                    MAX_JWT_EXPIRY_HOURS
                ),
            }
        }

        // GenAI overrides
        if let Ok(v) = env::var("GENAI_PROVIDER") {
            match v.parse() {
                Ok(kind) => self.genai.provider = kind,
                Err(e) => tracing::warn!("Ignoring GENAI_PROVIDER: {}", e),
            }
        }
        if let Ok(v) = env::var("GENAI_API_KEY") {
            self.genai.api_key = non_empty(v);
        }
        if let Ok(v) = env::var("GENAI_API_URL") {
            self.genai.api_url = non_empty(v);
        }
        if let Ok(v) = env::var("GENAI_MODEL") {
            self.genai.model = non_empty(v);
        }
        if let Ok(v) = env::var("GENAI_API_HEADERS") {
            match parse_extra_headers(&v) {
                Ok(headers) => self.genai.extra_headers = headers,
                Err(e) => tracing::warn!("Ignoring GENAI_API_HEADERS: {}", e),
            }
        }
        if let Ok(v) = env::var("GENAI_TIMEOUT_SECS") {
            self.genai.timeout_secs = v.parse().unwrap_or(self.genai.timeout_secs);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind_addr: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "taskboard-development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            genai: GenAiConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind_addr: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
            genai: GenAiConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind_addr: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
            genai: GenAiConfig::default(),
        }
    }
}

fn non_empty(v: String) -> Option<String> {
    let trimmed = v.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// Ten years.
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365 * 10;

/// Token lifetime in hours, rejecting zero and anything past [`MAX_JWT_EXPIRY_HOURS`].
pub fn parse_expiry_hours(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|h| (1..=MAX_JWT_EXPIRY_HOURS).contains(h))
}

/// Decode `GENAI_API_HEADERS`: a JSON object whose values are strings.
/// Non-string values are rendered with their JSON text.
pub fn parse_extra_headers(raw: &str) -> Result<BTreeMap<String, String>, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)?;
    Ok(map
        .into_iter()
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect())
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
