use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::lock::LockConfig;
use crate::orchestrator::LifecycleConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub fulfillment: FulfillmentConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub lock: LockConfig,
    #[serde(default)]
    pub mock_fulfillment: MockFulfillmentConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Order store backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local map, lost on restart
    #[default]
    Memory,
    /// SQLite file at `database.path`
    Sqlite,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("orderflow.db")
}

/// Fulfillment endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FulfillmentConfig {
    /// Endpoint orders are POSTed to
    #[serde(default = "default_fulfillment_url")]
    pub url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_fulfillment_timeout")]
    pub timeout_secs: u32,
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            url: default_fulfillment_url(),
            timeout_secs: default_fulfillment_timeout(),
        }
    }
}

fn default_fulfillment_url() -> String {
    "http://localhost:8080/mock/fulfillment".to_string()
}

fn default_fulfillment_timeout() -> u32 {
    10
}

/// Built-in fake fulfillment endpoint, served by the API process itself
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MockFulfillmentConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_mock_path")]
    pub path: String,
    #[serde(default)]
    pub mode: MockFulfillmentMode,
}

impl Default for MockFulfillmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_mock_path(),
            mode: MockFulfillmentMode::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_mock_path() -> String {
    "/mock/fulfillment".to_string()
}

/// How the built-in fulfillment endpoint answers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MockFulfillmentMode {
    #[default]
    AlwaysSucceed,
    AlwaysFail,
    /// Every n-th call fails, counting from 1
    FailEvery { n: u32 },
}

impl MockFulfillmentMode {
    /// Whether call number `call` (1-based) should succeed.
    pub fn succeeds(&self, call: u64) -> bool {
        match self {
            MockFulfillmentMode::AlwaysSucceed => true,
            MockFulfillmentMode::AlwaysFail => false,
            MockFulfillmentMode::FailEvery { n } => *n == 0 || call % u64::from(*n) != 0,
        }
    }
}
