use serde::Deserialize;
use std::env;
use tarmac_core::config::DEFAULT_CAPACITY_LIMIT;
use tarmac_core::search::DEFAULT_SEARCH_LIMIT;
use tarmac_core::{BookingConfig, IsolationLevel};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub booking: BookingSettings,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

fn default_max_connections() -> u32 { 5 }
fn default_acquire_timeout() -> u64 { 3 }

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingSettings {
    #[serde(default = "default_capacity_limit")]
    pub capacity_limit: u32,
    #[serde(default)]
    pub isolation: IsolationLevel,
    /// Total tries per booking request when the store reports a serialization conflict
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

fn default_capacity_limit() -> u32 { DEFAULT_CAPACITY_LIMIT }
fn default_max_attempts() -> u32 { 3 }
fn default_retry_backoff() -> u64 { 50 }

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            capacity_limit: default_capacity_limit(),
            isolation: IsolationLevel::default(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

impl BookingSettings {
    pub fn rules(&self) -> BookingConfig {
        BookingConfig {
            capacity_limit: self.capacity_limit,
            isolation: self.isolation,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { limit: DEFAULT_SEARCH_LIMIT }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. TARMAC__BOOKING__CAPACITY_LIMIT=1
            .add_source(config::Environment::with_prefix("TARMAC").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn from_toml(contents: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
