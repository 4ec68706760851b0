use axum::extract::{Json, Path, State};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::domain::AnalysisStatus;
use crate::engine::{self, Actor};
use crate::error::AppResult;
use crate::state::AppState;

use super::reports::AnalysisJobResponse;

#[derive(Deserialize)]
pub struct UpdateAnalysisRequest {
    pub status: AnalysisStatus,
    pub progress: Option<i32>,
    pub result: Option<Value>,
    pub confidence: Option<f64>,
    pub detections: Option<Value>,
    pub error: Option<String>,
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<Json<AnalysisJobResponse>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let job = engine::analysis::get_job(&mut conn, &actor, job_id)?;
    Ok(Json(AnalysisJobResponse::from(job)))
}

/// Callback used by the external AI worker to report progress and results.
pub async fn update_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateAnalysisRequest>,
) -> AppResult<Json<AnalysisJobResponse>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let job = engine::analysis::ingest_result(
        &mut conn,
        &actor,
        job_id,
        engine::analysis::IngestResultInput {
            status: payload.status,
            progress: payload.progress,
            result: payload.result,
            confidence: payload.confidence,
            detections: payload.detections,
            error: payload.error,
        },
    )?;
    Ok(Json(AnalysisJobResponse::from(job)))
}
