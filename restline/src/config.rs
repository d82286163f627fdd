//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following
//! precedence (highest to lowest):
//! 1. Environment variables (prefix: `RESTLINE_`)
//! 2. A TOML file (`./config.toml` by default)
//! 3. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level configuration for a service embedding the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// NATS configuration (optional)
    #[serde(default)]
    pub nats: Option<NatsConfig>,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// NATS connection settings for the broker adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NatsConfig {
    /// Server URL, e.g. `nats://localhost:4222`
    pub url: String,

    /// Client connection name
    #[serde(default)]
    pub name: Option<String>,

    /// Maximum reconnect attempts on an established connection
    #[serde(default = "default_max_reconnects")]
    pub max_reconnects: usize,

    /// Maximum initial connection retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between connection retries, in seconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_reconnects() -> usize {
    10
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    2
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "restline".to_string(),
                port: default_port(),
                log_level: default_log_level(),
            },
            nats: None,
        }
    }
}

impl Config {
    /// Load configuration from `./config.toml` and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load configuration from a specific file, overridden by
    /// `RESTLINE_`-prefixed environment variables.
    pub fn load_from(path: &str) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("RESTLINE_").split("_"))
            .extract()?;

        Ok(config)
    }
}
