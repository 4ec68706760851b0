use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::NotificationType;
use crate::error::{AppError, AppResult};
use crate::models::{NewNotification, Notification};
use crate::schema::notifications;

pub struct NotificationParams {
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub recipient: Uuid,
}

/// Appends an inbox entry for the recipient. Runs inside the caller's
/// transaction; only a store-level failure propagates.
pub fn dispatch(conn: &mut PgConnection, params: NotificationParams) -> AppResult<Notification> {
    let new_notification = NewNotification {
        id: Uuid::new_v4(),
        notification_type: params.kind.as_str().to_string(),
        title: params.title,
        message: params.message,
        link: params.link,
        user_id: params.recipient,
    };

    diesel::insert_into(notifications::table)
        .values(&new_notification)
        .execute(conn)?;

    let notification = notifications::table.find(new_notification.id).first(conn)?;
    Ok(notification)
}

pub fn list_for_user(
    conn: &mut PgConnection,
    user_id: Uuid,
    unread_only: bool,
) -> AppResult<Vec<Notification>> {
    let mut query = notifications::table
        .filter(notifications::user_id.eq(user_id))
        .into_boxed();
    if unread_only {
        query = query.filter(notifications::is_read.eq(false));
    }
    let rows = query.order(notifications::created_at.desc()).load(conn)?;
    Ok(rows)
}

pub fn unread_count(conn: &mut PgConnection, user_id: Uuid) -> AppResult<i64> {
    let count = notifications::table
        .filter(notifications::user_id.eq(user_id))
        .filter(notifications::is_read.eq(false))
        .count()
        .get_result(conn)?;
    Ok(count)
}

/// Flips `is_read` for one of the recipient's notifications. Idempotent:
/// an already-read row is returned untouched, keeping the `read_at` of the
/// first successful call.
pub fn mark_read(conn: &mut PgConnection, user_id: Uuid, id: Uuid) -> AppResult<Notification> {
    let existing: Notification = notifications::table
        .find(id)
        .filter(notifications::user_id.eq(user_id))
        .first(conn)
        .optional()?
        .ok_or(AppError::NotFound)?;

    if existing.is_read {
        return Ok(existing);
    }

    diesel::update(notifications::table.find(id))
        .set((
            notifications::is_read.eq(true),
            notifications::read_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)?;

    let updated = notifications::table.find(id).first(conn)?;
    Ok(updated)
}

pub fn mark_all_read(conn: &mut PgConnection, user_id: Uuid) -> AppResult<usize> {
    let updated = diesel::update(
        notifications::table
            .filter(notifications::user_id.eq(user_id))
            .filter(notifications::is_read.eq(false)),
    )
    .set((
        notifications::is_read.eq(true),
        notifications::read_at.eq(Utc::now().naive_utc()),
    ))
    .execute(conn)?;
    Ok(updated)
}
