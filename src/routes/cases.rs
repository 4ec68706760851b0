use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::activity;
use crate::auth::AuthenticatedUser;
use crate::domain::{CaseStatus, NoteType, Priority};
use crate::engine::{self, Actor};
use crate::error::AppResult;
use crate::models::Case;
use crate::state::AppState;

use super::reports::{ActivityResponse, NoteResponse};
use super::{parse_datetime, to_iso};

const ACTIVITY_PAGE: i64 = 50;

#[derive(Deserialize)]
pub struct CaseListQuery {
    pub status: Option<CaseStatus>,
}

#[derive(Deserialize)]
pub struct CreateCaseRequest {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub owner_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: CaseStatus,
    pub expected_status: Option<CaseStatus>,
}

#[derive(Deserialize)]
pub struct TeamMemberRequest {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct AddReportRequest {
    pub report_id: Uuid,
}

#[derive(Deserialize)]
pub struct CourtDateRequest {
    pub court_date: Option<String>,
}

#[derive(Deserialize)]
pub struct AddNoteRequest {
    pub content: String,
    pub note_type: NoteType,
    #[serde(default)]
    pub is_internal: bool,
}

#[derive(Deserialize)]
pub struct UpdateLegalRequest {
    pub legal_status: Option<String>,
    pub verdict: Option<String>,
}

#[derive(Serialize)]
pub struct CaseResponse {
    pub id: Uuid,
    pub case_number: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub owner_id: Uuid,
    pub court_date: Option<String>,
    pub legal_status: Option<String>,
    pub verdict: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Case> for CaseResponse {
    fn from(case: Case) -> Self {
        Self {
            id: case.id,
            case_number: case.case_number,
            title: case.title,
            description: case.description,
            status: case.status,
            priority: case.priority,
            owner_id: case.owner_id,
            court_date: case.court_date.map(to_iso),
            legal_status: case.legal_status,
            verdict: case.verdict,
            created_at: to_iso(case.created_at),
            updated_at: to_iso(case.updated_at),
        }
    }
}

#[derive(Serialize)]
pub struct CaseDetailResponse {
    #[serde(flatten)]
    pub case: CaseResponse,
    pub team: Vec<Uuid>,
    pub report_ids: Vec<Uuid>,
}

pub async fn list_cases(
    State(state): State<AppState>,
    Query(params): Query<CaseListQuery>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<CaseResponse>>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let rows = engine::cases::list_cases(&mut conn, &actor, params.status)?;
    Ok(Json(rows.into_iter().map(CaseResponse::from).collect()))
}

pub async fn create_case(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateCaseRequest>,
) -> AppResult<(StatusCode, Json<CaseResponse>)> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let case = engine::cases::create_case(
        &mut conn,
        &actor,
        engine::cases::CreateCaseInput {
            title: payload.title,
            description: payload.description,
            priority: payload.priority,
            owner_id: payload.owner_id,
        },
    )?;
    Ok((StatusCode::CREATED, Json(CaseResponse::from(case))))
}

pub async fn get_case(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<Json<CaseDetailResponse>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let case = engine::cases::get_case(&mut conn, &actor, case_id)?;
    let team = engine::cases::team_member_ids(&mut conn, case_id)?;
    let report_ids = engine::cases::linked_report_ids(&mut conn, case_id)?;
    Ok(Json(CaseDetailResponse {
        case: CaseResponse::from(case),
        team,
        report_ids,
    }))
}

pub async fn delete_case(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    engine::cases::delete_case(&mut conn, &actor, case_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<CaseResponse>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let case = engine::cases::update_status(
        &mut conn,
        &actor,
        case_id,
        payload.status,
        payload.expected_status,
    )?;
    Ok(Json(CaseResponse::from(case)))
}

pub async fn add_team_member(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(payload): Json<TeamMemberRequest>,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    engine::cases::add_team_member(&mut conn, &actor, case_id, payload.user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_team_member(
    State(state): State<AppState>,
    Path((case_id, user_id)): Path<(Uuid, Uuid)>,
    user: AuthenticatedUser,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    engine::cases::remove_team_member(&mut conn, &actor, case_id, user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_report(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(payload): Json<AddReportRequest>,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    engine::cases::add_report(&mut conn, &actor, case_id, payload.report_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_court_date(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(payload): Json<CourtDateRequest>,
) -> AppResult<Json<CaseResponse>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let court_date = payload
        .court_date
        .as_deref()
        .map(parse_datetime)
        .transpose()?;
    let case = engine::cases::set_court_date(&mut conn, &actor, case_id, court_date)?;
    Ok(Json(CaseResponse::from(case)))
}

pub async fn update_legal(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateLegalRequest>,
) -> AppResult<Json<CaseResponse>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let case = engine::cases::update_legal(
        &mut conn,
        &actor,
        case_id,
        engine::cases::UpdateLegalInput {
            legal_status: payload.legal_status,
            verdict: payload.verdict,
        },
    )?;
    Ok(Json(CaseResponse::from(case)))
}

pub async fn list_notes(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<NoteResponse>>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    engine::cases::get_case(&mut conn, &actor, case_id)?;
    let rows = engine::notes::list_for_case(&mut conn, &actor, case_id)?;
    Ok(Json(rows.into_iter().map(NoteResponse::from).collect()))
}

pub async fn add_note(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(payload): Json<AddNoteRequest>,
) -> AppResult<(StatusCode, Json<NoteResponse>)> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let note = engine::notes::add_note(
        &mut conn,
        &actor,
        engine::notes::AddNoteInput {
            content: payload.content,
            note_type: payload.note_type,
            is_internal: payload.is_internal,
            report_id: None,
            case_id: Some(case_id),
        },
    )?;
    Ok((StatusCode::CREATED, Json(NoteResponse::from(note))))
}

pub async fn list_activity(
    State(state): State<AppState>,
    Path(case_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<ActivityResponse>>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    engine::cases::get_case(&mut conn, &actor, case_id)?;
    let rows = activity::for_case(&mut conn, case_id, ACTIVITY_PAGE)?;
    Ok(Json(rows.into_iter().map(ActivityResponse::from).collect()))
}
