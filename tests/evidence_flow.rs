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
struct EvidenceInfo {
    id: Uuid,
    title: String,
    description: Option<String>,
    content_hash: String,
    collected_by: Uuid,
    collected_at: String,
}

const SAMPLE_HASH: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

#[tokio::test]
async fn custody_fields_are_frozen_at_creation() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let officer_id = app.insert_user("officer@agency.gov", "pass", "officer").await?;
    let officer_token = app.login_token("officer@agency.gov", "pass").await?;

    let response = app
        .post_json(
            "/api/reports",
            &json!({
                "title": "Dumping site discovered",
                "description": "Several barrels of industrial waste dumped near the reservoir",
                "report_type": "illegal_dumping",
                "priority": "high",
                "incident_date": "2026-07-10T06:00:00Z",
            }),
            Some(&officer_token),
        )
        .await?;
    let body = body_to_vec(response.into_body()).await?;
    let report: ReportInfo = serde_json::from_slice(&body)?;

    let response = app
        .post_json(
            "/api/evidence",
            &json!({
                "evidence_type": "photo",
                "title": "Barrel close-up",
                "file_url": "s3://evidence/barrels-01.jpg",
                "content_hash": SAMPLE_HASH,
                "collected_at": "2026-07-10T07:15:00Z",
                "report_id": report.id,
            }),
            Some(&officer_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_to_vec(response.into_body()).await?;
    let evidence: EvidenceInfo = serde_json::from_slice(&body)?;
    assert_eq!(evidence.collected_by, officer_id);
    assert_eq!(evidence.content_hash, SAMPLE_HASH);

    // non-custody fields are editable
    let response = app
        .patch_json(
            &format!("/api/evidence/{}", evidence.id),
            &json!({ "title": "Barrel close-up (north bank)", "description": "Taken at dawn" }),
            Some(&officer_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_vec(response.into_body()).await?;
    let updated: EvidenceInfo = serde_json::from_slice(&body)?;
    assert_eq!(updated.title, "Barrel close-up (north bank)");
    assert_eq!(updated.description.as_deref(), Some("Taken at dawn"));

    // custody fields are not
    for payload in [
        json!({ "content_hash": "0000000000000000000000000000000000000000000000000000000000000000" }),
        json!({ "collected_by": Uuid::new_v4() }),
        json!({ "collected_at": "2026-07-11T00:00:00Z" }),
        json!({ "file_url": "s3://evidence/tampered.jpg" }),
    ] {
        let response = app
            .patch_json(
                &format!("/api/evidence/{}", evidence.id),
                &payload,
                Some(&officer_token),
            )
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .get(&format!("/api/evidence/{}", evidence.id), Some(&officer_token))
        .await?;
    let body = body_to_vec(response.into_body()).await?;
    let current: EvidenceInfo = serde_json::from_slice(&body)?;
    assert_eq!(current.content_hash, SAMPLE_HASH);
    assert_eq!(current.collected_by, officer_id);
    assert_eq!(current.collected_at, evidence.collected_at);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn evidence_requires_a_link_and_a_capability() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("officer@agency.gov", "pass", "officer").await?;
    app.insert_user("citizen@example.com", "pass", "citizen").await?;
    let officer_token = app.login_token("officer@agency.gov", "pass").await?;
    let citizen_token = app.login_token("citizen@example.com", "pass").await?;

    // no report or case link
    let response = app
        .post_json(
            "/api/evidence",
            &json!({
                "evidence_type": "sample",
                "title": "Water sample",
                "file_url": "s3://evidence/sample-001",
                "content_hash": SAMPLE_HASH,
                "collected_at": "2026-07-10T07:15:00Z",
            }),
            Some(&officer_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // citizens cannot create evidence at all
    let response = app
        .post_json(
            "/api/evidence",
            &json!({
                "evidence_type": "sample",
                "title": "Water sample",
                "file_url": "s3://evidence/sample-001",
                "content_hash": SAMPLE_HASH,
                "collected_at": "2026-07-10T07:15:00Z",
                "report_id": Uuid::new_v4(),
            }),
            Some(&citizen_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    app.cleanup().await?;
    Ok(())
}
