use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use serde_json::json;
use tokio::task;
use tracing::{error, info};

use crate::{
    domain::{CaseStatus, NotificationType},
    jobs::{enqueue_job, JOB_SCAN_COURT_DEADLINES, STATUS_QUEUED},
    models::Case,
    notify::{self, NotificationParams},
    schema::{case_team, cases, jobs, notifications},
    state::AppState,
};

use super::{JobExecution, JobHandler};

#[derive(Debug, Deserialize)]
struct ScanPayload {
    #[serde(default)]
    window_days: Option<i64>,
}

/// Walks cases whose court date falls inside the warning window and drops
/// a deadline notification into the inboxes of the owner and team. The
/// scan re-enqueues itself a day out, so seeding one job keeps it running.
pub struct ScanCourtDeadlinesJob;

impl ScanCourtDeadlinesJob {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl JobHandler for ScanCourtDeadlinesJob {
    fn job_type(&self) -> &'static str {
        JOB_SCAN_COURT_DEADLINES
    }

    async fn handle(&self, state: Arc<AppState>, job: crate::models::Job) -> JobExecution {
        let payload: ScanPayload = match serde_json::from_value(job.payload.clone()) {
            Ok(payload) => payload,
            Err(err) => {
                return JobExecution::Failed {
                    error: format!("invalid scan payload: {err}"),
                }
            }
        };

        let state_clone = state.clone();
        match task::spawn_blocking(move || scan_deadlines(state_clone, payload)).await {
            Ok(Ok(execution)) => execution,
            Ok(Err(err)) => JobExecution::Retry {
                delay: Duration::from_secs(60),
                error: err,
            },
            Err(join_err) => {
                error!(job_id = %job.id, error = %join_err, "deadline scan panicked");
                JobExecution::Retry {
                    delay: Duration::from_secs(120),
                    error: format!("worker panicked: {join_err}"),
                }
            }
        }
    }
}

fn scan_deadlines(state: Arc<AppState>, payload: ScanPayload) -> Result<JobExecution, String> {
    let mut conn = state.db().map_err(|err| format!("{err:?}"))?;

    let window_days = payload
        .window_days
        .unwrap_or(state.config.deadline_window_days);
    let now = Utc::now().naive_utc();
    let horizon = now + ChronoDuration::days(window_days);

    let upcoming: Vec<Case> = cases::table
        .filter(cases::deleted_at.is_null())
        .filter(cases::court_date.between(now, horizon))
        .filter(diesel::dsl::not(cases::status.eq_any([
            CaseStatus::Closed.as_str(),
            CaseStatus::Dismissed.as_str(),
        ])))
        .load(&mut conn)
        .map_err(|err| format!("{err:?}"))?;

    let mut dispatched = 0usize;
    for case in &upcoming {
        let court_date = match case.court_date {
            Some(dt) => dt,
            None => continue,
        };

        let mut recipients: Vec<uuid::Uuid> = case_team::table
            .filter(case_team::case_id.eq(case.id))
            .select(case_team::user_id)
            .load(&mut conn)
            .map_err(|err| format!("{err:?}"))?;
        if !recipients.contains(&case.owner_id) {
            recipients.push(case.owner_id);
        }

        let link = format!("/cases/{}", case.id);
        for recipient in recipients {
            // One reminder per case and recipient per day.
            let recently_notified: i64 = notifications::table
                .filter(notifications::user_id.eq(recipient))
                .filter(notifications::notification_type.eq(NotificationType::Deadline.as_str()))
                .filter(notifications::link.eq(&link))
                .filter(notifications::created_at.gt(now - ChronoDuration::days(1)))
                .count()
                .get_result(&mut conn)
                .map_err(|err| format!("{err:?}"))?;
            if recently_notified > 0 {
                continue;
            }

            notify::dispatch(
                &mut conn,
                NotificationParams {
                    kind: NotificationType::Deadline,
                    title: "Upcoming court date".to_string(),
                    message: format!(
                        "Case {} has a court date on {}",
                        case.case_number,
                        court_date.format("%Y-%m-%d")
                    ),
                    link: Some(link.clone()),
                    recipient,
                },
            )
            .map_err(|err| format!("{err:?}"))?;
            dispatched += 1;
        }
    }

    info!(
        cases = upcoming.len(),
        notifications = dispatched,
        window_days,
        "deadline scan finished"
    );

    // Keep the scan alive: one queued successor at most.
    let pending: i64 = jobs::table
        .filter(jobs::job_type.eq(JOB_SCAN_COURT_DEADLINES))
        .filter(jobs::status.eq(STATUS_QUEUED))
        .count()
        .get_result(&mut conn)
        .map_err(|err| format!("{err:?}"))?;
    if pending == 0 {
        enqueue_job(
            &mut conn,
            JOB_SCAN_COURT_DEADLINES,
            json!({ "window_days": payload.window_days }),
            Some(now + ChronoDuration::days(1)),
        )
        .map_err(|err| err.to_string())?;
    }

    Ok(JobExecution::Success)
}
