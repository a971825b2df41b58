//! Service Bus (Message Queue) HTTP Handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::application::QueueMessage;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub message_id: String,
    pub queue_name: String,
    pub subject: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxMessagesQuery {
    pub max_messages: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message_id: String,
    pub subject: Option<String>,
    pub body: String,
    pub enqueued_time: DateTime<Utc>,
    pub delivery_count: u32,
    pub properties: Map<String, Value>,
}

impl From<QueueMessage> for MessageResponse {
    fn from(message: QueueMessage) -> Self {
        Self {
            message_id: message.message_id,
            subject: message.subject,
            body: message.body,
            enqueued_time: message.enqueued_time,
            delivery_count: message.delivery_count,
            properties: message.properties,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub count: usize,
    pub messages: Vec<MessageResponse>,
}

impl MessagesResponse {
    fn new(messages: Vec<QueueMessage>) -> Self {
        Self {
            count: messages.len(),
            messages: messages.into_iter().map(MessageResponse::from).collect(),
        }
    }
}

fn max_messages(
    query: Result<Query<MaxMessagesQuery>, QueryRejection>,
    default: u32,
) -> Result<u32, ApiError> {
    let Query(query) = query
        .map_err(|e| ApiError::BadRequest(format!("Invalid query: {}", e.body_text())))?;

    match query.max_messages {
        Some(0) => Err(ApiError::BadRequest(
            "maxMessages must be greater than 0".to_string(),
        )),
        Some(n) => Ok(n),
        None => Ok(default),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// 发送消息到队列
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SendMessageResponse>>, ApiError> {
    let Json(req) = payload
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))?;

    let message = req
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Message cannot be empty".to_string()))?;
    let subject = req.subject.filter(|s| !s.is_empty());

    let sent = state
        .message_queue
        .send(&message, subject.as_deref())
        .await?;

    Ok(Json(
        ApiResponse::success(SendMessageResponse {
            message_id: sent.message_id,
            queue_name: state.message_queue.queue_name().to_string(),
            subject: sent.subject,
            sent_at: sent.sent_at,
        })
        .with_message("Message sent successfully!"),
    ))
}

/// 接收消息（接收后立即 complete，从队列移除）
pub async fn receive_messages(
    State(state): State<Arc<AppState>>,
    query: Result<Query<MaxMessagesQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<MessagesResponse>>, ApiError> {
    let max = max_messages(query, state.queue_options.default_max_messages)?;

    let messages = state
        .message_queue
        .receive(max, state.queue_options.receive_wait)
        .await?;

    for message in &messages {
        state.message_queue.complete(message).await?;
    }

    let response = MessagesResponse::new(messages);
    let summary = format!("Received {} message(s)", response.count);

    Ok(Json(ApiResponse::success(response).with_message(summary)))
}

/// 查看消息（不移除，不改变投递次数）
pub async fn peek_messages(
    State(state): State<Arc<AppState>>,
    query: Result<Query<MaxMessagesQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<MessagesResponse>>, ApiError> {
    let max = max_messages(query, state.queue_options.default_max_messages)?;

    let messages = state.message_queue.peek(max).await?;

    let response = MessagesResponse::new(messages);
    let summary = format!("Peeked {} message(s)", response.count);

    Ok(Json(ApiResponse::success(response).with_message(summary)))
}
