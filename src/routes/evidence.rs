use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::domain::EvidenceType;
use crate::engine::{self, Actor};
use crate::error::{AppError, AppResult};
use crate::models::Evidence;
use crate::state::AppState;

use super::{parse_datetime, to_iso};

/// Chain-of-custody columns. A PATCH naming any of these is rejected
/// outright; a correction is a new evidence record.
const CUSTODY_FIELDS: &[&str] = &[
    "content_hash",
    "collected_by",
    "collected_at",
    "file_url",
    "evidence_type",
];

#[derive(Deserialize)]
pub struct EvidenceListQuery {
    pub report_id: Option<Uuid>,
    pub case_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct CreateEvidenceRequest {
    pub evidence_type: EvidenceType,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub content_hash: String,
    pub collected_at: String,
    pub report_id: Option<Uuid>,
    pub case_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct EvidenceResponse {
    pub id: Uuid,
    pub evidence_type: String,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub content_hash: String,
    pub collected_by: Uuid,
    pub collected_at: String,
    pub report_id: Option<Uuid>,
    pub case_id: Option<Uuid>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Evidence> for EvidenceResponse {
    fn from(record: Evidence) -> Self {
        Self {
            id: record.id,
            evidence_type: record.evidence_type,
            title: record.title,
            description: record.description,
            file_url: record.file_url,
            content_hash: record.content_hash,
            collected_by: record.collected_by,
            collected_at: to_iso(record.collected_at),
            report_id: record.report_id,
            case_id: record.case_id,
            created_at: to_iso(record.created_at),
            updated_at: to_iso(record.updated_at),
        }
    }
}

pub async fn list_evidence(
    State(state): State<AppState>,
    Query(params): Query<EvidenceListQuery>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<EvidenceResponse>>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let rows =
        engine::evidence::list_evidence(&mut conn, &actor, params.report_id, params.case_id)?;
    Ok(Json(rows.into_iter().map(EvidenceResponse::from).collect()))
}

pub async fn create_evidence(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateEvidenceRequest>,
) -> AppResult<(StatusCode, Json<EvidenceResponse>)> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;

    let record = engine::evidence::create_evidence(
        &mut conn,
        &actor,
        engine::evidence::CreateEvidenceInput {
            evidence_type: payload.evidence_type,
            title: payload.title,
            description: payload.description,
            file_url: payload.file_url,
            content_hash: payload.content_hash,
            collected_at: parse_datetime(&payload.collected_at)?,
            report_id: payload.report_id,
            case_id: payload.case_id,
        },
    )?;

    Ok((StatusCode::CREATED, Json(EvidenceResponse::from(record))))
}

pub async fn get_evidence(
    State(state): State<AppState>,
    Path(evidence_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<Json<EvidenceResponse>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let record = engine::evidence::get_evidence(&mut conn, &actor, evidence_id)?;
    Ok(Json(EvidenceResponse::from(record)))
}

pub async fn update_evidence(
    State(state): State<AppState>,
    Path(evidence_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(body): Json<Value>,
) -> AppResult<Json<EvidenceResponse>> {
    let object = body
        .as_object()
        .ok_or_else(|| AppError::validation("expected a JSON object"))?;

    for field in CUSTODY_FIELDS {
        if object.contains_key(*field) {
            return Err(AppError::validation(format!(
                "{field} is immutable; record new evidence instead"
            )));
        }
    }

    let mut changes = engine::evidence::UpdateEvidenceChangeset::default();
    for (key, value) in object {
        match (key.as_str(), value) {
            ("title", Value::String(title)) => changes.title = Some(title.clone()),
            ("title", _) => return Err(AppError::validation("title must be a string")),
            ("description", Value::String(description)) => {
                changes.description = Some(Some(description.clone()))
            }
            ("description", Value::Null) => changes.description = Some(None),
            ("description", _) => {
                return Err(AppError::validation("description must be a string or null"))
            }
            (other, _) => {
                return Err(AppError::validation(format!("unknown field {other}")));
            }
        }
    }

    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let record = engine::evidence::update_evidence(&mut conn, &actor, evidence_id, changes)?;
    Ok(Json(EvidenceResponse::from(record)))
}
