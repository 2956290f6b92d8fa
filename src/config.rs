use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const DEFAULT_CATEGORIES_FILE: &str = "data/categories.json";
const DEFAULT_MENUS_FILE: &str = "data/menus.json";
const DEFAULT_UPLOAD_DIR: &str = "static/uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Currency applied to menu items that do not declare one.
pub const DEFAULT_CURRENCY: &str = "KHR";
/// Image path shared by every item without an uploaded picture.
pub const PLACEHOLDER_IMAGE: &str = "static/images/default.jpg";

/// Which persistence backend the category/menu repositories run against.
///
/// The JSON backend is the legacy flat-file store the import reads from;
/// the SQL backend is the relational store it writes to. Exactly one is
/// active at runtime.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Json,
    #[default]
    Sql,
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Repository backend selection
    #[serde(default)]
    pub storage_backend: StorageBackend,

    /// Flat-file store: categories document
    #[serde(default = "default_categories_file")]
    pub categories_file: PathBuf,

    /// Flat-file store: menus document
    #[serde(default = "default_menus_file")]
    pub menus_file: PathBuf,

    /// Directory uploaded images are stored in
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Upload size cap in bytes
    #[serde(default = "default_max_upload_bytes")]
    #[validate(custom = "validate_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    #[validate(range(min = 1))]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_categories_file() -> PathBuf {
    PathBuf::from(DEFAULT_CATEGORIES_FILE)
}

fn default_menus_file() -> PathBuf {
    PathBuf::from(DEFAULT_MENUS_FILE)
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from(DEFAULT_UPLOAD_DIR)
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_min_connections() -> u32 {
    1
}

fn default_db_connect_timeout_secs() -> u64 {
    30
}

fn default_db_idle_timeout_secs() -> u64 {
    600
}

fn default_db_acquire_timeout_secs() -> u64 {
    8
}

fn validate_max_upload_bytes(bytes: usize) -> Result<(), ValidationError> {
    if bytes == 0 {
        let mut err = ValidationError::new("max_upload_bytes");
        err.message = Some("max_upload_bytes must be greater than 0".into());
        return Err(err);
    }
    Ok(())
}

impl AppConfig {
    /// Convenience constructor used by tests and tools that do not go
    /// through the layered file/env loader.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            storage_backend: StorageBackend::Sql,
            categories_file: default_categories_file(),
            menus_file: default_menus_file(),
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
        }
    }
}

/// Configuration loading error
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("menu_api={level}");
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Default config (config/default.toml)
/// 2. Environment-specific config (config/{env}.toml)
/// 3. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://menu.db?mode=rwc")?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
        .add_source(File::with_name(&format!("{CONFIG_DIR}/{run_env}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}
