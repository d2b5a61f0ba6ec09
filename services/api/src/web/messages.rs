//! services/api/src/web/messages.rs
//!
//! Direct messages between users and the per-user conversation list.

use afrilead_core::domain::Message;
use afrilead_core::validation::validate_message_content;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{AppError, AppResult, ErrorBody};
use crate::web::extract::{JsonBody, JsonQuery};
use crate::web::state::AppState;
use crate::web::views::{load_summaries, MessageView, UserSummary};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListMessagesParams {
    /// `true` returns the caller's inbox instead of a single thread.
    pub conversations: Option<String>,
    /// The other party of the thread to read.
    pub user_id: Option<Uuid>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LastMessageView {
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub sender_id: Uuid,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub other_user: UserSummary,
    pub last_message: LastMessageView,
    pub unread_count: u64,
}

#[derive(Serialize, ToSchema)]
pub struct ConversationsResponse {
    pub conversations: Vec<ConversationView>,
}

#[derive(Serialize, ToSchema)]
pub struct MessagesResponse {
    pub messages: Vec<MessageView>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageBody {
    pub receiver_id: Option<Uuid>,
    pub content: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SendMessageResponse {
    pub message: MessageView,
    pub status: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/messages - The caller's inbox, or one thread
#[utoipa::path(
    get,
    path = "/api/messages",
    params(ListMessagesParams),
    responses(
        (status = 200, description = "Conversations (`conversations=true`) or one thread (`userId`)", body = MessagesResponse),
        (status = 400, description = "Neither parameter given", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn list_messages_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    JsonQuery(params): JsonQuery<ListMessagesParams>,
) -> AppResult<Response> {
    if params.conversations.as_deref() == Some("true") {
        return Ok(Json(conversations(&state, user_id).await?).into_response());
    }

    let other_id = params.user_id.ok_or_else(|| {
        AppError::bad_request("Please specify userId or set conversations=true")
    })?;

    let messages = state.db.get_messages_between(user_id, other_id).await?;
    let marked = state
        .db
        .mark_messages_read(other_id, user_id, Utc::now())
        .await?;
    debug!(user_id = %user_id, other_id = %other_id, marked, "Marked messages read");

    Ok(Json(MessagesResponse {
        messages: messages.iter().map(MessageView::from).collect(),
    })
    .into_response())
}

/// Conversations whose other party no longer exists are left out.
async fn conversations(state: &AppState, user_id: Uuid) -> AppResult<ConversationsResponse> {
    let conversations = state.db.list_conversations(user_id).await?;
    let users = load_summaries(
        state.db.as_ref(),
        conversations.iter().map(|c| c.other_user_id),
    )
    .await?;

    Ok(ConversationsResponse {
        conversations: conversations
            .into_iter()
            .filter_map(|c| {
                let other_user = users.get(&c.other_user_id)?.clone();
                Some(ConversationView {
                    other_user,
                    last_message: LastMessageView {
                        content: c.last_message.content,
                        created_at: c.last_message.created_at,
                        sender_id: c.last_message.sender_id,
                    },
                    unread_count: c.unread_count,
                })
            })
            .collect(),
    })
}

/// POST /api/messages - Send a direct message
#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessageBody,
    responses(
        (status = 201, description = "Message sent", body = SendMessageResponse),
        (status = 400, description = "Invalid message", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 404, description = "Receiver not found", body = ErrorBody)
    )
)]
pub async fn send_message_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    JsonBody(body): JsonBody<SendMessageBody>,
) -> AppResult<impl IntoResponse> {
    let (Some(receiver_id), Some(content)) = (
        body.receiver_id,
        body.content.filter(|c| !c.trim().is_empty()),
    ) else {
        return Err(AppError::bad_request("Receiver ID and content are required"));
    };
    validate_message_content(&content)?;

    if state.db.get_users(&[receiver_id]).await?.is_empty() {
        return Err(AppError::not_found("Receiver not found"));
    }

    let now = Utc::now();
    let message = state
        .db
        .create_message(Message {
            id: Uuid::new_v4(),
            sender_id: user_id,
            receiver_id,
            content,
            read: false,
            read_at: None,
            created_at: now,
            updated_at: now,
        })
        .await?;
    info!(message_id = %message.id, sender_id = %user_id, receiver_id = %receiver_id, "Message sent");

    Ok((
        StatusCode::CREATED,
        Json(SendMessageResponse {
            message: MessageView::from(&message),
            status: "Message sent successfully".to_string(),
        }),
    ))
}
