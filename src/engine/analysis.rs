use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use tracing::info;
use uuid::Uuid;

use crate::activity::{self, ActivityEntry};
use crate::domain::{
    ActivityMetadata, ActivityType, AnalysisStatus, AnalysisType, NotificationType,
};
use crate::error::{AppError, AppResult};
use crate::models::{AnalysisJob, NewAnalysisJob, Report};
use crate::notify::{self, NotificationParams};
use crate::policy::Action;
use crate::schema::{analysis_jobs, reports};

use super::{require, Actor};

pub fn request_analysis(
    conn: &mut PgConnection,
    actor: &Actor,
    report_id: Uuid,
    analysis_type: AnalysisType,
) -> AppResult<AnalysisJob> {
    require(actor, Action::AnalysisRequest)?;

    conn.transaction::<AnalysisJob, AppError, _>(|conn| {
        let report: Report = reports::table
            .find(report_id)
            .first(conn)
            .optional()?
            .ok_or(AppError::NotFound)?;

        let new_job = NewAnalysisJob {
            id: Uuid::new_v4(),
            analysis_type: analysis_type.as_str().to_string(),
            status: AnalysisStatus::Queued.as_str().to_string(),
            report_id,
            requested_by: actor.id,
            progress: 0,
        };

        diesel::insert_into(analysis_jobs::table)
            .values(&new_job)
            .execute(conn)?;

        let job: AnalysisJob = analysis_jobs::table.find(new_job.id).first(conn)?;

        activity::record(
            conn,
            ActivityEntry {
                activity_type: ActivityType::Create,
                action: format!(
                    "requested {} analysis for report {}",
                    analysis_type.as_str(),
                    report.report_number
                ),
                description: None,
                metadata: Some(ActivityMetadata::Analysis {
                    job_id: job.id,
                    analysis_type: analysis_type.as_str().to_string(),
                    status: AnalysisStatus::Queued.as_str().to_string(),
                }),
                actor_id: actor.id,
                report_id: Some(report_id),
                case_id: None,
            },
        )?;

        Ok(job)
    })
}

pub struct IngestResultInput {
    pub status: AnalysisStatus,
    pub progress: Option<i32>,
    pub result: Option<serde_json::Value>,
    pub confidence: Option<f64>,
    pub detections: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// Records a status/result update from the external AI worker. Only a
/// queued or processing job may move; terminal states are final and any
/// further update is rejected as an illegal transition.
pub fn ingest_result(
    conn: &mut PgConnection,
    actor: &Actor,
    job_id: Uuid,
    input: IngestResultInput,
) -> AppResult<AnalysisJob> {
    require(actor, Action::AnalysisIngest)?;

    if let Some(progress) = input.progress {
        if !(0..=100).contains(&progress) {
            return Err(AppError::validation("progress must be between 0 and 100"));
        }
    }

    conn.transaction::<AnalysisJob, AppError, _>(|conn| {
        let job: AnalysisJob = analysis_jobs::table
            .find(job_id)
            .for_update()
            .first(conn)
            .optional()?
            .ok_or(AppError::NotFound)?;

        let current = parse_status(&job.status)?;
        if current.is_terminal() {
            return Err(AppError::invalid_transition(
                current.as_str(),
                input.status.as_str(),
            ));
        }

        let progress = match input.status {
            AnalysisStatus::Completed => 100,
            _ => input.progress.unwrap_or(job.progress),
        };

        diesel::update(analysis_jobs::table.find(job_id))
            .set((
                analysis_jobs::status.eq(input.status.as_str()),
                analysis_jobs::progress.eq(progress),
                analysis_jobs::result.eq(input.result),
                analysis_jobs::confidence.eq(input.confidence),
                analysis_jobs::detections.eq(input.detections),
                analysis_jobs::error.eq(input.error),
                analysis_jobs::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;

        let updated: AnalysisJob = analysis_jobs::table.find(job_id).first(conn)?;

        activity::record(
            conn,
            ActivityEntry {
                activity_type: ActivityType::Analysis,
                action: format!(
                    "analysis {} moved to {}",
                    job.analysis_type,
                    input.status.as_str()
                ),
                description: None,
                metadata: Some(ActivityMetadata::Analysis {
                    job_id,
                    analysis_type: job.analysis_type.clone(),
                    status: input.status.as_str().to_string(),
                }),
                actor_id: actor.id,
                report_id: Some(job.report_id),
                case_id: None,
            },
        )?;

        if input.status == AnalysisStatus::Completed && job.requested_by != actor.id {
            notify::dispatch(
                conn,
                NotificationParams {
                    kind: NotificationType::Analysis,
                    title: "Analysis completed".to_string(),
                    message: format!("The {} analysis you requested has completed", job.analysis_type),
                    link: Some(format!("/reports/{}/analysis", job.report_id)),
                    recipient: job.requested_by,
                },
            )?;
        }

        info!(job_id = %job_id, status = input.status.as_str(), "analysis update ingested");
        Ok(updated)
    })
}

pub fn get_job(conn: &mut PgConnection, actor: &Actor, job_id: Uuid) -> AppResult<AnalysisJob> {
    require(actor, Action::AnalysisRead)?;
    let job: AnalysisJob = analysis_jobs::table
        .find(job_id)
        .first(conn)
        .optional()?
        .ok_or(AppError::NotFound)?;
    Ok(job)
}

pub fn list_for_report(
    conn: &mut PgConnection,
    actor: &Actor,
    report_id: Uuid,
) -> AppResult<Vec<AnalysisJob>> {
    require(actor, Action::AnalysisRead)?;
    let rows = analysis_jobs::table
        .filter(analysis_jobs::report_id.eq(report_id))
        .order(analysis_jobs::created_at.desc())
        .load(conn)?;
    Ok(rows)
}

pub(crate) fn parse_status(value: &str) -> AppResult<AnalysisStatus> {
    AnalysisStatus::parse(value)
        .ok_or_else(|| AppError::internal(format!("unknown analysis status in store: {value}")))
}
