use chrono::{Duration, Utc};
use diesel::dsl::count_star;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{AnalysisStatus, CaseStatus, Role};
use crate::engine::{require, Actor};
use crate::error::AppResult;
use crate::models::Report;
use crate::policy::Action;
use crate::schema::{analysis_jobs, case_team, cases, notifications, reports, users};

const RECENT_LIMIT: i64 = 5;

#[derive(Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Serialize)]
pub struct PriorityCount {
    pub priority: String,
    pub count: i64,
}

#[derive(Serialize)]
pub struct RecentReport {
    pub id: Uuid,
    pub report_number: String,
    pub title: String,
    pub status: String,
    pub priority: String,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct ReportStats {
    pub by_status: Vec<StatusCount>,
    pub by_priority: Vec<PriorityCount>,
    pub recent: Vec<RecentReport>,
}

/// Derived, read-only projection of the reports table. Never consulted for
/// permission decisions.
pub fn report_stats(conn: &mut PgConnection, actor: &Actor) -> AppResult<ReportStats> {
    require(actor, Action::StatsRead)?;

    let by_status: Vec<(String, i64)> = reports::table
        .group_by(reports::status)
        .select((reports::status, count_star()))
        .load(conn)?;

    let by_priority: Vec<(String, i64)> = reports::table
        .group_by(reports::priority)
        .select((reports::priority, count_star()))
        .load(conn)?;

    let recent: Vec<Report> = reports::table
        .order(reports::created_at.desc())
        .limit(RECENT_LIMIT)
        .load(conn)?;

    Ok(ReportStats {
        by_status: by_status
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect(),
        by_priority: by_priority
            .into_iter()
            .map(|(priority, count)| PriorityCount { priority, count })
            .collect(),
        recent: recent
            .into_iter()
            .map(|report| RecentReport {
                id: report.id,
                report_number: report.report_number,
                title: report.title,
                status: report.status,
                priority: report.priority,
                created_at: report.created_at.and_utc().to_rfc3339(),
            })
            .collect(),
    })
}

#[derive(Serialize)]
pub struct DashboardStats {
    pub role: String,
    pub unread_notifications: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_reports: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_reports: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_cases: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_analyses: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_analyses: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_court_cases: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upcoming_deadlines: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_reports: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cases: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_users: Option<i64>,
}

/// Role-specific dashboard blocks. Everything is scoped to the acting
/// user, so every role (citizens included) may call it.
pub fn dashboard_stats(
    conn: &mut PgConnection,
    actor: &Actor,
    deadline_window_days: i64,
) -> AppResult<DashboardStats> {
    let unread_notifications: i64 = notifications::table
        .filter(notifications::user_id.eq(actor.id))
        .filter(notifications::is_read.eq(false))
        .count()
        .get_result(conn)?;

    let mut stats = DashboardStats {
        role: actor.role.as_str().to_string(),
        unread_notifications,
        my_reports: None,
        assigned_reports: None,
        active_cases: None,
        active_analyses: None,
        completed_analyses: None,
        in_court_cases: None,
        upcoming_deadlines: None,
        total_reports: None,
        total_cases: None,
        total_users: None,
    };

    match actor.role {
        Role::Officer => {
            stats.my_reports = Some(
                reports::table
                    .filter(reports::author_id.eq(actor.id))
                    .count()
                    .get_result(conn)?,
            );
            stats.assigned_reports = Some(
                reports::table
                    .filter(reports::assignee_id.eq(actor.id))
                    .count()
                    .get_result(conn)?,
            );
            stats.active_cases = Some(active_case_count(conn, actor.id)?);
        }
        Role::Analyst => {
            stats.active_analyses = Some(
                analysis_jobs::table
                    .filter(analysis_jobs::requested_by.eq(actor.id))
                    .filter(analysis_jobs::status.eq_any([
                        AnalysisStatus::Queued.as_str(),
                        AnalysisStatus::Processing.as_str(),
                    ]))
                    .count()
                    .get_result(conn)?,
            );
            stats.completed_analyses = Some(
                analysis_jobs::table
                    .filter(analysis_jobs::requested_by.eq(actor.id))
                    .filter(analysis_jobs::status.eq(AnalysisStatus::Completed.as_str()))
                    .count()
                    .get_result(conn)?,
            );
        }
        Role::Prosecutor => {
            let involved = involved_case_ids(conn, actor.id)?;
            stats.active_cases = Some(active_case_count(conn, actor.id)?);
            stats.in_court_cases = Some(
                cases::table
                    .filter(cases::deleted_at.is_null())
                    .filter(cases::id.eq_any(&involved))
                    .filter(cases::status.eq(CaseStatus::InCourt.as_str()))
                    .count()
                    .get_result(conn)?,
            );
            let now = Utc::now().naive_utc();
            let horizon = now + Duration::days(deadline_window_days);
            stats.upcoming_deadlines = Some(
                cases::table
                    .filter(cases::deleted_at.is_null())
                    .filter(cases::id.eq_any(&involved))
                    .filter(cases::court_date.between(now, horizon))
                    .count()
                    .get_result(conn)?,
            );
        }
        Role::Citizen => {
            stats.my_reports = Some(
                reports::table
                    .filter(reports::author_id.eq(actor.id))
                    .count()
                    .get_result(conn)?,
            );
        }
        Role::Admin => {
            stats.total_reports = Some(reports::table.count().get_result(conn)?);
            stats.total_cases = Some(
                cases::table
                    .filter(cases::deleted_at.is_null())
                    .count()
                    .get_result(conn)?,
            );
            stats.total_users = Some(users::table.count().get_result(conn)?);
        }
    }

    Ok(stats)
}

/// Ids of the cases the user owns or serves on the team of.
fn involved_case_ids(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Vec<Uuid>> {
    let mut ids: Vec<Uuid> = case_team::table
        .filter(case_team::user_id.eq(user_id))
        .select(case_team::case_id)
        .load(conn)?;
    let owned: Vec<Uuid> = cases::table
        .filter(cases::owner_id.eq(user_id))
        .select(cases::id)
        .load(conn)?;
    for id in owned {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

fn active_case_count(conn: &mut PgConnection, user_id: Uuid) -> AppResult<i64> {
    let involved = involved_case_ids(conn, user_id)?;
    let count = cases::table
        .filter(cases::deleted_at.is_null())
        .filter(cases::id.eq_any(&involved))
        .filter(diesel::dsl::not(cases::status.eq_any([
            CaseStatus::Closed.as_str(),
            CaseStatus::Dismissed.as_str(),
        ])))
        .count()
        .get_result(conn)?;
    Ok(count)
}
