//! Mailing HTTP Handlers

use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::OutgoingMail;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 默认收件人
pub const DEFAULT_RECIPIENT: &str = "test@example.com";
/// 默认主题
pub const DEFAULT_MAIL_SUBJECT: &str = "Test Email from Infra Showcase";
/// 默认正文
pub const DEFAULT_MAIL_BODY: &str = r#"
<h1>Hello from Infra Showcase!</h1>
<p>This is a test email sent via the configured SMTP server.</p>
<p>If you're seeing this, the email integration is working correctly!</p>
"#;

// ============================================================================
// DTOs
// ============================================================================

/// 所有字段可选，缺失或为空时使用默认值
#[derive(Debug, Default, Deserialize)]
pub struct SendMailRequest {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

impl SendMailRequest {
    fn into_mail(self) -> OutgoingMail {
        fn or_default(value: Option<String>, default: &str) -> String {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        }

        OutgoingMail {
            to: or_default(self.to, DEFAULT_RECIPIENT),
            subject: or_default(self.subject, DEFAULT_MAIL_SUBJECT),
            html_body: or_default(self.body, DEFAULT_MAIL_BODY),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendMailResponse {
    pub to: String,
    pub subject: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// 发送邮件，请求体可以为空
pub async fn send_mail(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiResponse<SendMailResponse>>, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        SendMailRequest::default()
    } else {
        serde_json::from_slice::<Option<SendMailRequest>>(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?
            .unwrap_or_default()
    };

    let mail = request.into_mail();
    state.mail_sender.send(&mail).await?;

    Ok(Json(
        ApiResponse::success(SendMailResponse {
            to: mail.to,
            subject: mail.subject,
        })
        .with_message("Email sent successfully!"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let mail = SendMailRequest::default().into_mail();
        assert_eq!(mail.to, DEFAULT_RECIPIENT);
        assert_eq!(mail.subject, DEFAULT_MAIL_SUBJECT);
        assert_eq!(mail.html_body, DEFAULT_MAIL_BODY);
    }

    #[test]
    fn test_blank_fields_use_defaults() {
        let mail = SendMailRequest {
            to: Some("  ".into()),
            subject: Some("Hi".into()),
            body: None,
        }
        .into_mail();
        assert_eq!(mail.to, DEFAULT_RECIPIENT);
        assert_eq!(mail.subject, "Hi");
    }
}
