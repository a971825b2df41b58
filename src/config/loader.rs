//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;
use url::Url;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "SHOWCASE";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `SHOWCASE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `SHOWCASE_APP__ENVIRONMENT=development`
/// - `SHOWCASE_SERVER__PORT=8080`
/// - `SHOWCASE_BLOB__URL=az://test-container-1`
/// - `SHOWCASE_MAIL__CONNECTION_STRING=Host=mailpit;Port=1025`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("app.environment", "production")?
        .set_default("app.name", "Infra Showcase")?
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("server.max_upload_size", 50 * 1024 * 1024)?
        .set_default("database.url", "sqlite:data/showcase.db?mode=rwc")?
        .set_default("database.max_connections", 5)?
        .set_default("blob.url", "memory://")?
        .set_default("blob.container", "test-container-1")?
        .set_default("queue.name", "demo-queue")?
        .set_default("queue.receive_wait_secs", 5)?
        .set_default("queue.lock_duration_secs", 30)?
        .set_default("queue.source", "Infra Showcase")?
        .set_default("mail.from_name", "Infra Showcase")?
        .set_default("mail.from_address", "noreply@infra-showcase.local")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 例如: SHOWCASE_QUEUE__NAME=orders
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.server.max_upload_size == 0 {
        return Err(ConfigError::ValidationError(
            "Max upload size cannot be 0".to_string(),
        ));
    }

    if config.database.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database url cannot be empty".to_string(),
        ));
    }

    if config.database.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "Database max connections cannot be 0".to_string(),
        ));
    }

    if let Err(e) = Url::parse(&config.blob.url) {
        return Err(ConfigError::ValidationError(format!(
            "Invalid blob url {}: {}",
            config.blob.url, e
        )));
    }

    if config.blob.container.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Blob container cannot be empty".to_string(),
        ));
    }

    if config.queue.name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Queue name cannot be empty".to_string(),
        ));
    }

    if config.queue.lock_duration_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Queue lock duration cannot be 0".to_string(),
        ));
    }

    if config.mail.from_address.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Mail sender address cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
///
/// 邮件连接串和 blob 选项可能带凭据，只打印是否设置
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("App: {} ({})", config.app.name, config.app.environment);
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Public Base URL: {}", config.server.public_base_url());
    if let Some(dir) = config.server.static_dir() {
        tracing::info!("Static Files: {:?}", dir);
    }
    tracing::info!("Database: {}", config.database.url);
    tracing::info!("Database Max Connections: {}", config.database.max_connections);
    tracing::info!("Blob Storage: {} (container: {})", config.blob.url, config.blob.container);
    tracing::info!("Blob Options: {} set", config.blob.options.len());
    tracing::info!("Queue: {}", config.queue.name);
    tracing::info!("Queue Receive Wait: {}s", config.queue.receive_wait_secs);
    tracing::info!(
        "Mail Connection String: {}",
        if config.mail.connection_string.is_some() { "set" } else { "default (localhost:1025)" }
    );
    tracing::info!("Mail Sender: {} <{}>", config.mail.from_name, config.mail.from_address);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
