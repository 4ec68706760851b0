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
struct AnalysisJobInfo {
    id: Uuid,
    status: String,
    progress: i32,
    confidence: Option<f64>,
}

async fn setup_report_and_job(
    app: &TestApp,
    officer_token: &str,
) -> Result<(ReportInfo, AnalysisJobInfo)> {
    let response = app
        .post_json(
            "/api/reports",
            &json!({
                "title": "Drone footage of clearing",
                "description": "Aerial footage shows a freshly cleared strip inside the reserve",
                "report_type": "deforestation",
                "priority": "high",
                "incident_date": "2026-07-25T10:00:00Z",
            }),
            Some(officer_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_to_vec(response.into_body()).await?;
    let report: ReportInfo = serde_json::from_slice(&body)?;

    let response = app
        .post_json(
            &format!("/api/reports/{}/analysis", report.id),
            &json!({ "analysis_type": "object_detection" }),
            Some(officer_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_to_vec(response.into_body()).await?;
    let job: AnalysisJobInfo = serde_json::from_slice(&body)?;
    assert_eq!(job.status, "queued");
    assert_eq!(job.progress, 0);

    Ok((report, job))
}

#[tokio::test]
async fn worker_updates_flow_until_a_terminal_state() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let officer_id = app.insert_user("officer@agency.gov", "pass", "officer").await?;
    app.insert_user("worker@agency.gov", "pass", "analyst").await?;
    let officer_token = app.login_token("officer@agency.gov", "pass").await?;
    let worker_token = app.login_token("worker@agency.gov", "pass").await?;

    let (_report, job) = setup_report_and_job(&app, &officer_token).await?;

    let response = app
        .patch_json(
            &format!("/api/analysis/{}/status", job.id),
            &json!({ "status": "processing", "progress": 40 }),
            Some(&worker_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_vec(response.into_body()).await?;
    let updated: AnalysisJobInfo = serde_json::from_slice(&body)?;
    assert_eq!(updated.status, "processing");
    assert_eq!(updated.progress, 40);

    let response = app
        .patch_json(
            &format!("/api/analysis/{}/status", job.id),
            &json!({
                "status": "completed",
                "confidence": 0.93,
                "result": { "label": "recent clear-cut" },
                "detections": [{ "kind": "logging_road", "score": 0.88 }],
            }),
            Some(&worker_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_vec(response.into_body()).await?;
    let done: AnalysisJobInfo = serde_json::from_slice(&body)?;
    assert_eq!(done.status, "completed");
    assert_eq!(done.progress, 100);
    assert_eq!(done.confidence, Some(0.93));

    // the requester hears about the completion
    let notifications = app.notifications_for_user(officer_id).await?;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].notification_type, "analysis");

    // completed is final
    let response = app
        .patch_json(
            &format!("/api/analysis/{}/status", job.id),
            &json!({ "status": "processing", "progress": 10 }),
            Some(&worker_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .get(&format!("/api/analysis/{}", job.id), Some(&worker_token))
        .await?;
    let body = body_to_vec(response.into_body()).await?;
    let current: AnalysisJobInfo = serde_json::from_slice(&body)?;
    assert_eq!(current.status, "completed");
    assert_eq!(current.progress, 100);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn ingest_validates_progress_and_capability() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("officer@agency.gov", "pass", "officer").await?;
    app.insert_user("worker@agency.gov", "pass", "analyst").await?;
    let officer_token = app.login_token("officer@agency.gov", "pass").await?;
    let worker_token = app.login_token("worker@agency.gov", "pass").await?;

    let (_report, job) = setup_report_and_job(&app, &officer_token).await?;

    let response = app
        .patch_json(
            &format!("/api/analysis/{}/status", job.id),
            &json!({ "status": "processing", "progress": 150 }),
            Some(&worker_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // officers are not ingest endpoints
    let response = app
        .patch_json(
            &format!("/api/analysis/{}/status", job.id),
            &json!({ "status": "processing", "progress": 10 }),
            Some(&officer_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    app.cleanup().await?;
    Ok(())
}
