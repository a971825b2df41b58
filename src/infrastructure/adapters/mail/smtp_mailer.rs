//! SMTP Mailer - 基于 lettre 的邮件发送实现
//!
//! 面向本地开发用的 SMTP 捕获服务（如 MailPit），明文连接、无认证

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::application::ports::{MailError, MailSenderPort, OutgoingMail};

/// 默认 SMTP 主机
const DEFAULT_SMTP_HOST: &str = "localhost";
/// 默认 SMTP 端口（MailPit）
const DEFAULT_SMTP_PORT: u16 = 1025;

/// SMTP 连接参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
        }
    }
}

impl SmtpSettings {
    /// 解析 `host=localhost;port=1025` 格式的连接字符串
    ///
    /// 键不区分大小写，未知键忽略，缺失的键使用默认值
    pub fn from_connection_string(connection_string: Option<&str>) -> Result<Self, MailError> {
        let mut settings = Self::default();

        let Some(connection_string) = connection_string.filter(|s| !s.trim().is_empty()) else {
            return Ok(settings);
        };

        for part in connection_string.split(';') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            if key.eq_ignore_ascii_case("host") {
                settings.host = value.to_string();
            } else if key.eq_ignore_ascii_case("port") {
                settings.port = value.parse().map_err(|_| {
                    MailError::InvalidConnectionString(format!("invalid port: {}", value))
                })?;
            }
        }

        Ok(settings)
    }
}

/// SMTP 邮件发送器
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    settings: SmtpSettings,
}

impl SmtpMailer {
    pub fn new(
        settings: SmtpSettings,
        from_name: &str,
        from_address: &str,
    ) -> Result<Self, MailError> {
        let from = Mailbox::new(Some(from_name.to_string()), parse_address(from_address)?);

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
            .port(settings.port)
            .build();

        Ok(Self {
            transport,
            from,
            settings,
        })
    }

    fn build_message(&self, mail: &OutgoingMail) -> Result<Message, MailError> {
        let to = Mailbox::new(Some("User".to_string()), parse_address(&mail.to)?);

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(mail.html_body.clone())
            .map_err(|e| MailError::BuildError(e.to_string()))
    }
}

fn parse_address(address: &str) -> Result<Address, MailError> {
    address
        .trim()
        .parse::<Address>()
        .map_err(|e| MailError::InvalidAddress(format!("{}: {}", address, e)))
}

#[async_trait]
impl MailSenderPort for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = self.build_message(mail)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::info!(
            to = %mail.to,
            smtp_host = %self.settings.host,
            smtp_port = self.settings.port,
            "Email sent successfully"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_string_defaults() {
        assert_eq!(
            SmtpSettings::from_connection_string(None).unwrap(),
            SmtpSettings::default()
        );
        assert_eq!(
            SmtpSettings::from_connection_string(Some("  ")).unwrap(),
            SmtpSettings::default()
        );
    }

    #[test]
    fn test_connection_string_parsing() {
        let settings =
            SmtpSettings::from_connection_string(Some("Host = mailpit ; PORT=2525;extra=1"))
                .unwrap();
        assert_eq!(settings.host, "mailpit");
        assert_eq!(settings.port, 2525);
    }

    #[test]
    fn test_connection_string_partial() {
        let settings = SmtpSettings::from_connection_string(Some("host=smtp.local")).unwrap();
        assert_eq!(settings.host, "smtp.local");
        assert_eq!(settings.port, DEFAULT_SMTP_PORT);
    }

    #[test]
    fn test_connection_string_bad_port() {
        let err = SmtpSettings::from_connection_string(Some("host=a;port=abc")).unwrap_err();
        assert!(matches!(err, MailError::InvalidConnectionString(_)));
    }

    #[tokio::test]
    async fn test_build_message() {
        let mailer =
            SmtpMailer::new(SmtpSettings::default(), "Infra Showcase", "noreply@example.com")
                .unwrap();

        let message = mailer
            .build_message(&OutgoingMail {
                to: "test@example.com".to_string(),
                subject: "Hello".to_string(),
                html_body: "<h1>Hi</h1>".to_string(),
            })
            .unwrap();

        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("Subject: Hello"));
        assert!(formatted.contains("test@example.com"));
        assert!(formatted.contains("noreply@example.com"));
        assert!(formatted.contains("text/html"));
    }

    #[tokio::test]
    async fn test_invalid_recipient() {
        let mailer =
            SmtpMailer::new(SmtpSettings::default(), "Infra Showcase", "noreply@example.com")
                .unwrap();

        let err = mailer
            .build_message(&OutgoingMail {
                to: "not-an-address".to_string(),
                subject: "Hello".to_string(),
                html_body: String::new(),
            })
            .unwrap_err();
        assert!(matches!(err, MailError::InvalidAddress(_)));
    }

    #[test]
    fn test_invalid_sender() {
        assert!(SmtpMailer::new(SmtpSettings::default(), "x", "bad").is_err());
    }
}
