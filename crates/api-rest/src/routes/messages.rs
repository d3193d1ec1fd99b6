//! Direct messages between users. Every route requires authentication.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use clinic_core::models::{MessageDetail, SendMessageRequest};
use clinic_core::pagination::Page;
use clinic_core::services::MessageService;

use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct MessageRes {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: MessageDetail,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageListRes {
    pub success: bool,
    pub messages: Vec<MessageDetail>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total: u64,
}

impl From<Page<MessageDetail>> for MessageListRes {
    fn from(page: Page<MessageDetail>) -> Self {
        Self {
            success: true,
            messages: page.items,
            total_pages: page.total_pages,
            current_page: page.current_page,
            total: page.total,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountRes {
    pub success: bool,
    pub unread_count: u64,
}

#[derive(Serialize, ToSchema)]
pub struct MarkAllReadRes {
    pub success: bool,
    pub message: String,
    pub updated: u64,
}

#[derive(Deserialize, ToSchema)]
pub struct InboxQuery {
    pub unread: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", post(send))
        .route("/messages/inbox", get(inbox))
        .route("/messages/sent", get(sent))
        .route("/messages/unread-count", get(unread_count))
        .route("/messages/conversation/:userId", get(conversation))
        .route("/messages/read-all", patch(mark_all_read))
        .route("/messages/:id/read", patch(mark_read))
        .route("/messages/:id", delete(delete_message))
}

#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = MessageRes),
        (status = 400, description = "Empty subject or body"),
        (status = 404, description = "Receiver not found")
    )
)]
#[axum::debug_handler]
pub async fn send(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<(StatusCode, Json<MessageRes>)> {
    let sent = MessageService::new(state.store.clone()).send(auth.id(), req)?;
    Ok((
        StatusCode::CREATED,
        Json(MessageRes {
            success: true,
            message: Some("Message sent successfully".into()),
            data: sent,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/messages/inbox",
    responses(
        (status = 200, description = "Received messages, newest first", body = MessageListRes)
    )
)]
#[axum::debug_handler]
pub async fn inbox(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<InboxQuery>,
) -> ApiResult<Json<MessageListRes>> {
    let page = MessageService::new(state.store.clone()).inbox(
        auth.id(),
        query.unread.unwrap_or(false),
        query.page,
        query.limit,
    )?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/messages/sent",
    responses(
        (status = 200, description = "Sent messages, newest first", body = MessageListRes)
    )
)]
#[axum::debug_handler]
pub async fn sent(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<MessageListRes>> {
    let page = MessageService::new(state.store.clone()).sent(auth.id(), query.page, query.limit)?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/api/messages/unread-count",
    responses(
        (status = 200, description = "Number of unread received messages", body = UnreadCountRes)
    )
)]
#[axum::debug_handler]
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UnreadCountRes>> {
    let unread_count = MessageService::new(state.store.clone()).unread_count(auth.id())?;
    Ok(Json(UnreadCountRes {
        success: true,
        unread_count,
    }))
}

#[utoipa::path(
    get,
    path = "/api/messages/conversation/{userId}",
    responses(
        (status = 200, description = "Both directions of traffic with one user, oldest first in the page", body = MessageListRes)
    )
)]
#[axum::debug_handler]
pub async fn conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<MessageListRes>> {
    let page = MessageService::new(state.store.clone()).conversation(
        auth.id(),
        user_id,
        query.page,
        query.limit,
    )?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    patch,
    path = "/api/messages/read-all",
    responses(
        (status = 200, description = "All received messages marked read", body = MarkAllReadRes)
    )
)]
#[axum::debug_handler]
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<MarkAllReadRes>> {
    let updated = MessageService::new(state.store.clone()).mark_all_read(auth.id())?;
    Ok(Json(MarkAllReadRes {
        success: true,
        message: "All messages marked as read".into(),
        updated,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/messages/{id}/read",
    responses(
        (status = 200, description = "Message marked read", body = MessageRes),
        (status = 403, description = "Caller is not the receiver"),
        (status = 404, description = "Message not found")
    )
)]
#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageRes>> {
    let read = MessageService::new(state.store.clone()).mark_read(auth.id(), id)?;
    Ok(Json(MessageRes {
        success: true,
        message: None,
        data: read,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/messages/{id}",
    responses(
        (status = 200, description = "Message deleted"),
        (status = 403, description = "Caller is not the sender"),
        (status = 404, description = "Message not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    MessageService::new(state.store.clone()).delete(auth.id(), id)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Message deleted successfully"
    })))
}
