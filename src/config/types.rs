//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 应用信息
    #[serde(default)]
    pub app: AppInfoConfig,

    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Blob 存储配置
    #[serde(default)]
    pub blob: BlobConfig,

    /// 消息队列配置
    #[serde(default)]
    pub queue: QueueConfig,

    /// 邮件配置
    #[serde(default)]
    pub mail: MailConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 应用信息
#[derive(Debug, Clone, Deserialize)]
pub struct AppInfoConfig {
    /// 运行环境，`development` 时 500 响应包含真实错误信息
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_app_name")]
    pub name: String,
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_app_name() -> String {
    "Infra Showcase".to_string()
}

impl Default for AppInfoConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            name: default_app_name(),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 公开访问的 Base URL
    /// 如果未设置，则使用 http://{host}:{port}
    #[serde(default)]
    pub base_url: Option<String>,

    /// 静态文件服务配置
    #[serde(default)]
    pub static_files: StaticFilesConfig,

    /// 请求体大小上限（字节）
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

/// 静态文件服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    /// 是否启用静态文件服务
    #[serde(default)]
    pub enabled: bool,

    /// 静态文件目录
    #[serde(default = "default_static_dir")]
    pub dir: PathBuf,
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("wwwroot")
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_size() -> usize {
    50 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
            static_files: StaticFilesConfig::default(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 获取公开的 Base URL
    pub fn public_base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            let host = if self.host == "0.0.0.0" {
                "localhost"
            } else {
                &self.host
            };
            format!("http://{}:{}", host, self.port)
        })
    }

    /// 启用时返回静态文件目录
    pub fn static_dir(&self) -> Option<PathBuf> {
        self.static_files
            .enabled
            .then(|| self.static_files.dir.clone())
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite 连接 URL
    #[serde(default = "default_database_url")]
    pub url: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_url() -> String {
    "sqlite:data/showcase.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// `sqlite:` URL 对应的本地文件路径（内存数据库返回 None）
    pub fn file_path(&self) -> Option<PathBuf> {
        let rest = self.url.strip_prefix("sqlite:")?;
        let rest = rest.strip_prefix("//").unwrap_or(rest);
        let path = rest.split('?').next().unwrap_or_default();

        if path.is_empty() || path.starts_with(":memory:") {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }
}

/// Blob 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct BlobConfig {
    /// object_store URL（`memory://`、`file:///...`、`az://...`）
    #[serde(default = "default_blob_url")]
    pub url: String,

    /// 容器名称
    #[serde(default = "default_container")]
    pub container: String,

    /// 透传给 object_store 的选项（如 `azure_storage_account_name`、`azure_storage_use_emulator`）
    #[serde(default)]
    pub options: HashMap<String, String>,
}

fn default_blob_url() -> String {
    "memory://".to_string()
}

fn default_container() -> String {
    "test-container-1".to_string()
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            url: default_blob_url(),
            container: default_container(),
            options: HashMap::new(),
        }
    }
}

/// 消息队列配置
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// 队列名称
    #[serde(default = "default_queue_name")]
    pub name: String,

    /// receive 最长等待时间（秒）
    #[serde(default = "default_receive_wait")]
    pub receive_wait_secs: u64,

    /// 消息锁定时长（秒）
    #[serde(default = "default_lock_duration")]
    pub lock_duration_secs: u64,

    /// 消息属性 `Source` 的值
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_queue_name() -> String {
    "demo-queue".to_string()
}

fn default_receive_wait() -> u64 {
    5
}

fn default_lock_duration() -> u64 {
    30
}

fn default_source() -> String {
    "Infra Showcase".to_string()
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: default_queue_name(),
            receive_wait_secs: default_receive_wait(),
            lock_duration_secs: default_lock_duration(),
            source: default_source(),
        }
    }
}

/// 邮件配置
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// SMTP 连接串，格式 `Host=localhost;Port=1025`
    #[serde(default)]
    pub connection_string: Option<String>,

    /// 发件人名称
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// 发件人地址
    #[serde(default = "default_from_address")]
    pub from_address: String,
}

fn default_from_name() -> String {
    "Infra Showcase".to_string()
}

fn default_from_address() -> String {
    "noreply@infra-showcase.local".to_string()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            from_name: default_from_name(),
            from_address: default_from_address(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否使用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_base_url_fallback() {
        let server = ServerConfig::default();
        assert_eq!(server.public_base_url(), "http://localhost:8080");

        let server = ServerConfig {
            base_url: Some("https://showcase.example.com".into()),
            ..Default::default()
        };
        assert_eq!(server.public_base_url(), "https://showcase.example.com");
    }

    #[test]
    fn test_static_dir_only_when_enabled() {
        let mut server = ServerConfig::default();
        assert!(server.static_dir().is_none());

        server.static_files.enabled = true;
        assert_eq!(server.static_dir(), Some(PathBuf::from("wwwroot")));
    }

    #[test]
    fn test_database_file_path() {
        let db = DatabaseConfig::default();
        assert_eq!(db.file_path(), Some(PathBuf::from("data/showcase.db")));

        let db = DatabaseConfig {
            url: "sqlite::memory:".into(),
            ..Default::default()
        };
        assert_eq!(db.file_path(), None);
    }

    #[test]
    fn test_default_environment_is_production() {
        let app = AppInfoConfig::default();
        assert_eq!(app.environment, "production");
    }
}
