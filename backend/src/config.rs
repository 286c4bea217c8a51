//! Configuration management for the Inventory Dashboard
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with INV_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::StockPolicy;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Spreadsheet source for the sync job
    pub sheets: SheetsConfig,

    /// Report defaults
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

/// Where sheets are read from
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SheetSourceKind {
    Csv,
    Google,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SheetsConfig {
    pub source: SheetSourceKind,

    /// Directory holding `<table>.csv` files
    pub csv_dir: String,

    /// Spreadsheet key, required for the google source
    pub spreadsheet_id: Option<String>,

    pub export_base_url: String,

    /// HTTP timeout for sheet downloads
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// Size of the top-sellers ranking
    pub top_n: usize,

    pub stock_policy: StockPolicy,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("INV_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("sheets.source", "csv")?
            .set_default("sheets.csv_dir", "data")?
            .set_default("sheets.export_base_url", "https://docs.google.com")?
            .set_default("sheets.timeout_secs", 30)?
            .set_default("report.top_n", shared::DEFAULT_TOP_N as i64)?
            .set_default("report.stock_policy", StockPolicy::default().as_str())?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (INV_ prefix)
            .add_source(
                Environment::with_prefix("INV")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: shared::DEFAULT_TOP_N,
            stock_policy: StockPolicy::default(),
        }
    }
}
