//! Infra Showcase - 基础设施能力演示服务
//!
//! 启动顺序：配置 -> 日志 -> 数据库 -> 适配器 -> HTTP 服务器

use std::sync::Arc;
use std::time::Duration;

use infra_showcase::config::{load_config, print_config, LogConfig};
use infra_showcase::infrastructure::adapters::{
    ObjectStoreBlobStorage, SmtpMailer, SmtpSettings, SqliteMessageQueue, SqliteQueueConfig,
};
use infra_showcase::infrastructure::http::error::FaultPolicy;
use infra_showcase::infrastructure::http::state::QueueOptions;
use infra_showcase::infrastructure::http::{AppState, HttpServer, ServerConfig};
use infra_showcase::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteBookRepository,
};

fn init_tracing(log: &LogConfig) {
    let log_filter = format!(
        "{},infra_showcase={},tower_http=debug",
        log.level, log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("{} starting", config.app.name);
    print_config(&config);

    // 确保数据目录存在
    if let Some(db_path) = config.database.file_path() {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    // 初始化数据库
    let db_config = DatabaseConfig::new(&config.database.url, config.database.max_connections);
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建适配器
    let book_repo = Arc::new(SqliteBookRepository::new(pool.clone()));

    let blob_storage = Arc::new(ObjectStoreBlobStorage::from_url(
        &config.blob.url,
        &config.blob.options,
        &config.blob.container,
    )?);

    let message_queue = Arc::new(SqliteMessageQueue::new(
        pool.clone(),
        SqliteQueueConfig {
            queue_name: config.queue.name.clone(),
            source: config.queue.source.clone(),
            lock_duration: Duration::from_secs(config.queue.lock_duration_secs),
            ..Default::default()
        },
    ));

    let smtp_settings = SmtpSettings::from_connection_string(config.mail.connection_string.as_deref())?;
    tracing::info!(host = %smtp_settings.host, port = smtp_settings.port, "SMTP transport configured");
    let mail_sender = Arc::new(SmtpMailer::new(
        smtp_settings,
        &config.mail.from_name,
        &config.mail.from_address,
    )?);

    // 创建 HTTP 服务器
    let state = AppState::new(blob_storage, message_queue, mail_sender, book_repo)
        .with_queue_options(QueueOptions {
            receive_wait: Duration::from_secs(config.queue.receive_wait_secs),
            ..Default::default()
        })
        .with_fault_policy(FaultPolicy::for_environment(&config.app.environment));

    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_body_bytes(config.server.max_upload_size)
        .with_static_dir(config.server.static_dir());

    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
