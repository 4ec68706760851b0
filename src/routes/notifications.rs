use axum::extract::{Json, Path, Query, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::AppResult;
use crate::models::Notification;
use crate::notify;
use crate::state::AppState;

use super::to_iso;

#[derive(Deserialize)]
pub struct NotificationListQuery {
    #[serde(default)]
    pub unread: bool,
}

#[derive(Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub read_at: Option<String>,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            notification_type: notification.notification_type,
            title: notification.title,
            message: notification.message,
            link: notification.link,
            is_read: notification.is_read,
            read_at: notification.read_at.map(to_iso),
            created_at: to_iso(notification.created_at),
        }
    }
}

#[derive(Serialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationResponse>,
    pub unread_count: i64,
}

#[derive(Serialize)]
pub struct MarkAllReadResponse {
    pub updated: usize,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    Query(params): Query<NotificationListQuery>,
    user: AuthenticatedUser,
) -> AppResult<Json<NotificationListResponse>> {
    let mut conn = state.db()?;
    let rows = notify::list_for_user(&mut conn, user.user_id, params.unread)?;
    let unread_count = notify::unread_count(&mut conn, user.user_id)?;
    Ok(Json(NotificationListResponse {
        notifications: rows.into_iter().map(NotificationResponse::from).collect(),
        unread_count,
    }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<Json<NotificationResponse>> {
    let mut conn = state.db()?;
    let notification = notify::mark_read(&mut conn, user.user_id, notification_id)?;
    Ok(Json(NotificationResponse::from(notification)))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<MarkAllReadResponse>> {
    let mut conn = state.db()?;
    let updated = notify::mark_all_read(&mut conn, user.user_id)?;
    Ok(Json(MarkAllReadResponse { updated }))
}
