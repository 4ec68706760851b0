mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acquire_db_lock, body_to_vec, TestApp};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Deserialize)]
struct ReportInfo {
    id: Uuid,
}

#[derive(Deserialize)]
struct NotificationInfo {
    id: Uuid,
    notification_type: String,
    is_read: bool,
    read_at: Option<String>,
}

#[derive(Deserialize)]
struct NotificationList {
    notifications: Vec<NotificationInfo>,
    unread_count: i64,
}

async fn create_report(app: &TestApp, token: &str) -> Result<ReportInfo> {
    let response = app
        .post_json(
            "/api/reports",
            &json!({
                "title": "Smoke over the ridge",
                "description": "Continuous dark smoke rising from the recycling plant chimney",
                "report_type": "air_pollution",
                "priority": "medium",
                "incident_date": "2026-07-20T14:00:00Z",
            }),
            Some(token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_to_vec(response.into_body()).await?;
    Ok(serde_json::from_slice(&body)?)
}

#[tokio::test]
async fn assignment_notifies_the_assignee_but_never_the_actor() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let lead_id = app.insert_user("lead@agency.gov", "pass", "officer").await?;
    let field_id = app.insert_user("field@agency.gov", "pass", "officer").await?;
    let lead_token = app.login_token("lead@agency.gov", "pass").await?;

    let report = create_report(&app, &lead_token).await?;

    // self-assign: no notification
    let response = app
        .patch_json(
            &format!("/api/reports/{}/assignee", report.id),
            &json!({ "assignee_id": lead_id }),
            Some(&lead_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.notifications_for_user(lead_id).await?.is_empty());

    // handing it over: exactly one notification, addressed to the assignee
    let response = app
        .patch_json(
            &format!("/api/reports/{}/assignee", report.id),
            &json!({ "assignee_id": field_id }),
            Some(&lead_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let field_notifications = app.notifications_for_user(field_id).await?;
    assert_eq!(field_notifications.len(), 1);
    assert_eq!(field_notifications[0].notification_type, "assignment");
    assert!(app.notifications_for_user(lead_id).await?.is_empty());

    // moving to in_progress notifies the assignee, who is not the actor
    let response = app
        .patch_json(
            &format!("/api/reports/{}/status", report.id),
            &json!({ "status": "under_review" }),
            Some(&lead_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let response = app
        .patch_json(
            &format!("/api/reports/{}/status", report.id),
            &json!({ "status": "in_progress" }),
            Some(&lead_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(app.notifications_for_user(field_id).await?.len(), 2);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn mark_read_is_idempotent() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("lead@agency.gov", "pass", "officer").await?;
    let field_id = app.insert_user("field@agency.gov", "pass", "officer").await?;
    let lead_token = app.login_token("lead@agency.gov", "pass").await?;
    let field_token = app.login_token("field@agency.gov", "pass").await?;

    let report = create_report(&app, &lead_token).await?;
    app.patch_json(
        &format!("/api/reports/{}/assignee", report.id),
        &json!({ "assignee_id": field_id }),
        Some(&lead_token),
    )
    .await?;

    let response = app.get("/api/notifications", Some(&field_token)).await?;
    let body = body_to_vec(response.into_body()).await?;
    let list: NotificationList = serde_json::from_slice(&body)?;
    assert_eq!(list.unread_count, 1);
    let notification_id = list.notifications[0].id;

    let response = app
        .post_json(
            &format!("/api/notifications/{notification_id}/read"),
            &json!({}),
            Some(&field_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_vec(response.into_body()).await?;
    let first: NotificationInfo = serde_json::from_slice(&body)?;
    assert!(first.is_read);
    let first_read_at = first.read_at.clone().expect("read_at set");

    // a second call is a no-op, keeping the original read_at
    let response = app
        .post_json(
            &format!("/api/notifications/{notification_id}/read"),
            &json!({}),
            Some(&field_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_vec(response.into_body()).await?;
    let second: NotificationInfo = serde_json::from_slice(&body)?;
    assert!(second.is_read);
    assert_eq!(second.read_at.as_deref(), Some(first_read_at.as_str()));

    let response = app.get("/api/notifications", Some(&field_token)).await?;
    let body = body_to_vec(response.into_body()).await?;
    let list: NotificationList = serde_json::from_slice(&body)?;
    assert_eq!(list.unread_count, 0);
    assert_eq!(list.notifications.len(), 1);

    // readers cannot touch someone else's inbox
    let response = app
        .post_json(
            &format!("/api/notifications/{notification_id}/read"),
            &json!({}),
            Some(&lead_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn mark_all_read_clears_the_inbox() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("lead@agency.gov", "pass", "officer").await?;
    let field_id = app.insert_user("field@agency.gov", "pass", "officer").await?;
    let lead_token = app.login_token("lead@agency.gov", "pass").await?;
    let field_token = app.login_token("field@agency.gov", "pass").await?;

    for _ in 0..3 {
        let report = create_report(&app, &lead_token).await?;
        app.patch_json(
            &format!("/api/reports/{}/assignee", report.id),
            &json!({ "assignee_id": field_id }),
            Some(&lead_token),
        )
        .await?;
    }

    let response = app
        .post_json("/api/notifications/read-all", &json!({}), Some(&field_token))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/api/notifications?unread=true", Some(&field_token)).await?;
    let body = body_to_vec(response.into_body()).await?;
    let list: NotificationList = serde_json::from_slice(&body)?;
    assert_eq!(list.unread_count, 0);
    assert!(list.notifications.is_empty());

    app.cleanup().await?;
    Ok(())
}
