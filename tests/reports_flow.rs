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
    report_number: String,
    status: String,
    assignee_id: Option<Uuid>,
}

fn new_report_payload(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "description": "Oily discharge flowing into the creek behind the mill",
        "report_type": "water_pollution",
        "priority": "high",
        "location": "Miller Creek",
        "incident_date": "2026-07-01T08:30:00Z",
    })
}

async fn create_report(app: &TestApp, token: &str) -> Result<ReportInfo> {
    let response = app
        .post_json("/api/reports", &new_report_payload("Creek pollution"), Some(token))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_to_vec(response.into_body()).await?;
    Ok(serde_json::from_slice(&body)?)
}

#[tokio::test]
async fn report_lifecycle_follows_the_transition_graph() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("citizen@example.com", "pass", "citizen").await?;
    let officer_id = app.insert_user("officer@agency.gov", "pass", "officer").await?;
    let citizen_token = app.login_token("citizen@example.com", "pass").await?;
    let officer_token = app.login_token("officer@agency.gov", "pass").await?;

    let report = create_report(&app, &citizen_token).await?;
    assert_eq!(report.status, "submitted");
    assert!(report.report_number.starts_with("RPT-"));
    assert!(report.assignee_id.is_none());

    let activities = app.activities_for_report(report.id).await?;
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].activity_type, "create");

    // submitted -> under_review by the officer; no assignee, no notification
    let response = app
        .patch_json(
            &format!("/api/reports/{}/status", report.id),
            &json!({ "status": "under_review" }),
            Some(&officer_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.notifications_for_user(officer_id).await?.is_empty());

    // self-assign: activity yes, notification no
    let response = app
        .patch_json(
            &format!("/api/reports/{}/assignee", report.id),
            &json!({ "assignee_id": officer_id }),
            Some(&officer_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.notifications_for_user(officer_id).await?.is_empty());

    // under_review -> in_progress; actor is the assignee, still no notification
    let response = app
        .patch_json(
            &format!("/api/reports/{}/status", report.id),
            &json!({ "status": "in_progress" }),
            Some(&officer_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.notifications_for_user(officer_id).await?.is_empty());

    let activities = app.activities_for_report(report.id).await?;
    assert_eq!(activities.len(), 4);

    // backwards move is rejected and leaves no trace
    let response = app
        .patch_json(
            &format!("/api/reports/{}/status", report.id),
            &json!({ "status": "submitted" }),
            Some(&officer_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .get(&format!("/api/reports/{}", report.id), Some(&officer_token))
        .await?;
    let body = body_to_vec(response.into_body()).await?;
    let current: ReportInfo = serde_json::from_slice(&body)?;
    assert_eq!(current.status, "in_progress");
    assert_eq!(app.activities_for_report(report.id).await?.len(), 4);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn citizens_may_only_self_transition_while_submitted() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("citizen@example.com", "pass", "citizen").await?;
    app.insert_user("officer@agency.gov", "pass", "officer").await?;
    let citizen_token = app.login_token("citizen@example.com", "pass").await?;
    let officer_token = app.login_token("officer@agency.gov", "pass").await?;

    let report = create_report(&app, &citizen_token).await?;

    // while submitted, the author may move their own report forward
    let response = app
        .patch_json(
            &format!("/api/reports/{}/status", report.id),
            &json!({ "status": "under_review" }),
            Some(&citizen_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    // once under review, the author has no say anymore
    let before = app.activities_for_report(report.id).await?.len();
    let response = app
        .patch_json(
            &format!("/api/reports/{}/status", report.id),
            &json!({ "status": "resolved" }),
            Some(&citizen_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.activities_for_report(report.id).await?.len(), before);

    // and the officer path still works
    let response = app
        .patch_json(
            &format!("/api/reports/{}/status", report.id),
            &json!({ "status": "in_progress" }),
            Some(&officer_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn create_report_enforces_field_lengths() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("citizen@example.com", "pass", "citizen").await?;
    let token = app.login_token("citizen@example.com", "pass").await?;

    let response = app
        .post_json(
            "/api/reports",
            &json!({
                "title": "Oil",
                "description": "Oily discharge flowing into the creek behind the mill",
                "report_type": "water_pollution",
                "priority": "high",
                "incident_date": "2026-07-01T08:30:00Z",
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_json(
            "/api/reports",
            &json!({
                "title": "Creek pollution",
                "description": "too short",
                "report_type": "water_pollution",
                "priority": "high",
                "incident_date": "2026-07-01T08:30:00Z",
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/api/reports", Some(&token)).await?;
    let body = body_to_vec(response.into_body()).await?;
    let listed: Vec<ReportInfo> = serde_json::from_slice(&body)?;
    assert!(listed.is_empty());

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn stale_expected_status_is_a_conflict() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("officer@agency.gov", "pass", "officer").await?;
    let token = app.login_token("officer@agency.gov", "pass").await?;

    let report = create_report(&app, &token).await?;

    let response = app
        .patch_json(
            &format!("/api/reports/{}/status", report.id),
            &json!({ "status": "under_review", "expected_status": "submitted" }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    // a second writer still believes the report is submitted
    let response = app
        .patch_json(
            &format!("/api/reports/{}/status", report.id),
            &json!({ "status": "under_review", "expected_status": "submitted" }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .get(&format!("/api/reports/{}", report.id), Some(&token))
        .await?;
    let body = body_to_vec(response.into_body()).await?;
    let current: ReportInfo = serde_json::from_slice(&body)?;
    assert_eq!(current.status, "under_review");

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn citizens_never_see_other_peoples_reports_or_internal_notes() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("citizen@example.com", "pass", "citizen").await?;
    app.insert_user("nosy@example.com", "pass", "citizen").await?;
    app.insert_user("officer@agency.gov", "pass", "officer").await?;
    let citizen_token = app.login_token("citizen@example.com", "pass").await?;
    let nosy_token = app.login_token("nosy@example.com", "pass").await?;
    let officer_token = app.login_token("officer@agency.gov", "pass").await?;

    let report = create_report(&app, &citizen_token).await?;

    let response = app
        .get(&format!("/api/reports/{}", report.id), Some(&nosy_token))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post_json(
            &format!("/api/reports/{}/notes", report.id),
            &json!({ "content": "visible to the reporter", "note_type": "general" }),
            Some(&officer_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .post_json(
            &format!("/api/reports/{}/notes", report.id),
            &json!({ "content": "internal speculation", "note_type": "investigation", "is_internal": true }),
            Some(&officer_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    #[derive(Deserialize)]
    struct NoteInfo {
        content: String,
    }

    let response = app
        .get(&format!("/api/reports/{}/notes", report.id), Some(&citizen_token))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_vec(response.into_body()).await?;
    let notes: Vec<NoteInfo> = serde_json::from_slice(&body)?;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].content, "visible to the reporter");

    let response = app
        .get(&format!("/api/reports/{}/notes", report.id), Some(&officer_token))
        .await?;
    let body = body_to_vec(response.into_body()).await?;
    let notes: Vec<NoteInfo> = serde_json::from_slice(&body)?;
    assert_eq!(notes.len(), 2);

    app.cleanup().await?;
    Ok(())
}
