use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::activity;
use crate::auth::AuthenticatedUser;
use crate::domain::{AnalysisType, NoteType, Priority, ReportStatus, ReportType};
use crate::engine::{self, Actor};
use crate::error::{AppError, AppResult};
use crate::models::{Activity, AnalysisJob, Note, Report};
use crate::state::AppState;

use super::{parse_datetime, to_iso};

const ACTIVITY_PAGE: i64 = 50;

#[derive(Deserialize)]
pub struct ReportListQuery {
    pub status: Option<ReportStatus>,
    #[serde(default)]
    pub mine: bool,
}

#[derive(Deserialize)]
pub struct CreateReportRequest {
    pub title: String,
    pub description: String,
    pub report_type: ReportType,
    pub priority: Priority,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub incident_date: String,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ReportStatus,
    pub expected_status: Option<ReportStatus>,
}

#[derive(Deserialize)]
pub struct AssignRequest {
    pub assignee_id: Uuid,
}

#[derive(Deserialize)]
pub struct EscalateRequest {
    pub case_id: Option<Uuid>,
    pub case: Option<EscalateCaseFields>,
}

#[derive(Deserialize)]
pub struct EscalateCaseFields {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

#[derive(Deserialize)]
pub struct AddNoteRequest {
    pub content: String,
    pub note_type: NoteType,
    #[serde(default)]
    pub is_internal: bool,
}

#[derive(Deserialize)]
pub struct RequestAnalysisRequest {
    pub analysis_type: AnalysisType,
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub id: Uuid,
    pub report_number: String,
    pub title: String,
    pub description: String,
    pub report_type: String,
    pub status: String,
    pub priority: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub incident_date: String,
    pub author_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            report_number: report.report_number,
            title: report.title,
            description: report.description,
            report_type: report.report_type,
            status: report.status,
            priority: report.priority,
            location: report.location,
            latitude: report.latitude,
            longitude: report.longitude,
            incident_date: to_iso(report.incident_date),
            author_id: report.author_id,
            assignee_id: report.assignee_id,
            created_at: to_iso(report.created_at),
            updated_at: to_iso(report.updated_at),
        }
    }
}

#[derive(Serialize)]
pub struct NoteResponse {
    pub id: Uuid,
    pub content: String,
    pub note_type: String,
    pub is_internal: bool,
    pub author_id: Uuid,
    pub created_at: String,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            content: note.content,
            note_type: note.note_type,
            is_internal: note.is_internal,
            author_id: note.author_id,
            created_at: to_iso(note.created_at),
        }
    }
}

#[derive(Serialize)]
pub struct ActivityResponse {
    pub id: Uuid,
    pub activity_type: String,
    pub action: String,
    pub description: Option<String>,
    pub metadata: Option<Value>,
    pub user_id: Uuid,
    pub report_id: Option<Uuid>,
    pub case_id: Option<Uuid>,
    pub created_at: String,
}

impl From<Activity> for ActivityResponse {
    fn from(activity: Activity) -> Self {
        Self {
            id: activity.id,
            activity_type: activity.activity_type,
            action: activity.action,
            description: activity.description,
            metadata: activity.metadata,
            user_id: activity.user_id,
            report_id: activity.report_id,
            case_id: activity.case_id,
            created_at: to_iso(activity.created_at),
        }
    }
}

#[derive(Serialize)]
pub struct AnalysisJobResponse {
    pub id: Uuid,
    pub analysis_type: String,
    pub status: String,
    pub report_id: Uuid,
    pub requested_by: Uuid,
    pub progress: i32,
    pub result: Option<Value>,
    pub confidence: Option<f64>,
    pub detections: Option<Value>,
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<AnalysisJob> for AnalysisJobResponse {
    fn from(job: AnalysisJob) -> Self {
        Self {
            id: job.id,
            analysis_type: job.analysis_type,
            status: job.status,
            report_id: job.report_id,
            requested_by: job.requested_by,
            progress: job.progress,
            result: job.result,
            confidence: job.confidence,
            detections: job.detections,
            error: job.error,
            created_at: to_iso(job.created_at),
            updated_at: to_iso(job.updated_at),
        }
    }
}

pub async fn list_reports(
    State(state): State<AppState>,
    Query(params): Query<ReportListQuery>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<ReportResponse>>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let rows = engine::reports::list_reports(&mut conn, &actor, params.status, params.mine)?;
    Ok(Json(rows.into_iter().map(ReportResponse::from).collect()))
}

pub async fn create_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateReportRequest>,
) -> AppResult<(StatusCode, Json<ReportResponse>)> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;

    let report = engine::reports::create_report(
        &mut conn,
        &actor,
        engine::reports::CreateReportInput {
            title: payload.title,
            description: payload.description,
            report_type: payload.report_type,
            priority: payload.priority,
            location: payload.location,
            latitude: payload.latitude,
            longitude: payload.longitude,
            incident_date: parse_datetime(&payload.incident_date)?,
        },
    )?;

    Ok((StatusCode::CREATED, Json(ReportResponse::from(report))))
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(report_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<Json<ReportResponse>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let report = engine::reports::get_report(&mut conn, &actor, report_id)?;
    Ok(Json(ReportResponse::from(report)))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(report_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<ReportResponse>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let report = engine::reports::update_status(
        &mut conn,
        &actor,
        report_id,
        payload.status,
        payload.expected_status,
    )?;
    Ok(Json(ReportResponse::from(report)))
}

pub async fn assign_report(
    State(state): State<AppState>,
    Path(report_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(payload): Json<AssignRequest>,
) -> AppResult<Json<ReportResponse>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let report = engine::reports::assign(&mut conn, &actor, report_id, payload.assignee_id)?;
    Ok(Json(ReportResponse::from(report)))
}

pub async fn escalate_report(
    State(state): State<AppState>,
    Path(report_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(payload): Json<EscalateRequest>,
) -> AppResult<(StatusCode, Json<super::cases::CaseResponse>)> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;

    let target = match (payload.case_id, payload.case) {
        (Some(case_id), None) => engine::reports::EscalateTarget::Existing(case_id),
        (None, Some(fields)) => {
            engine::reports::EscalateTarget::NewCase(engine::cases::CreateCaseInput {
                title: fields.title,
                description: fields.description,
                priority: fields.priority,
                owner_id: None,
            })
        }
        _ => {
            return Err(AppError::validation(
                "provide either case_id or case, not both",
            ))
        }
    };

    let case = engine::reports::escalate_to_case(&mut conn, &actor, report_id, target)?;
    Ok((
        StatusCode::CREATED,
        Json(super::cases::CaseResponse::from(case)),
    ))
}

pub async fn list_notes(
    State(state): State<AppState>,
    Path(report_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<NoteResponse>>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let report = engine::reports::get_report(&mut conn, &actor, report_id)?;
    let rows = engine::notes::list_for_report(&mut conn, &actor, &report)?;
    Ok(Json(rows.into_iter().map(NoteResponse::from).collect()))
}

pub async fn add_note(
    State(state): State<AppState>,
    Path(report_id): Path<Uuid>,
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
            report_id: Some(report_id),
            case_id: None,
        },
    )?;
    Ok((StatusCode::CREATED, Json(NoteResponse::from(note))))
}

pub async fn list_activity(
    State(state): State<AppState>,
    Path(report_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<ActivityResponse>>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    // Authorizes the read; citizens only see their own reports.
    engine::reports::get_report(&mut conn, &actor, report_id)?;
    let rows = activity::for_report(&mut conn, report_id, ACTIVITY_PAGE)?;
    Ok(Json(rows.into_iter().map(ActivityResponse::from).collect()))
}

pub async fn list_analysis(
    State(state): State<AppState>,
    Path(report_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<AnalysisJobResponse>>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let rows = engine::analysis::list_for_report(&mut conn, &actor, report_id)?;
    Ok(Json(
        rows.into_iter().map(AnalysisJobResponse::from).collect(),
    ))
}

pub async fn request_analysis(
    State(state): State<AppState>,
    Path(report_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(payload): Json<RequestAnalysisRequest>,
) -> AppResult<(StatusCode, Json<AnalysisJobResponse>)> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let job =
        engine::analysis::request_analysis(&mut conn, &actor, report_id, payload.analysis_type)?;
    Ok((StatusCode::CREATED, Json(AnalysisJobResponse::from(job))))
}
