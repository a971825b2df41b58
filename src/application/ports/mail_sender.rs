//! Mail Sender Port - 出站端口

use async_trait::async_trait;
use thiserror::Error;

/// 邮件发送错误
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid SMTP connection string: {0}")]
    InvalidConnectionString(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    BuildError(String),

    #[error("SMTP error: {0}")]
    Transport(String),
}

/// 待发送邮件（HTML 正文）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Mail Sender Port
#[async_trait]
pub trait MailSenderPort: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}
