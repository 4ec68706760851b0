use chrono::{NaiveDateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use tracing::info;
use uuid::Uuid;

use crate::activity::{self, ActivityEntry};
use crate::domain::{
    ActivityMetadata, ActivityType, NotificationType, Priority, ReportStatus, ReportType, Role,
};
use crate::error::{AppError, AppResult};
use crate::models::{Case, CaseReport, NewCaseReport, NewReport, Report};
use crate::notify::{self, NotificationParams};
use crate::numbering;
use crate::policy::{can_perform, Action};
use crate::schema::{case_reports, cases, reports};

use super::{load_active_user, require, Actor};

const MIN_TITLE_CHARS: usize = 5;
const MIN_DESCRIPTION_CHARS: usize = 20;

pub struct CreateReportInput {
    pub title: String,
    pub description: String,
    pub report_type: ReportType,
    pub priority: Priority,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub incident_date: NaiveDateTime,
}

pub fn create_report(
    conn: &mut PgConnection,
    actor: &Actor,
    input: CreateReportInput,
) -> AppResult<Report> {
    require(actor, Action::ReportsCreate)?;

    let title = input.title.trim().to_string();
    if title.chars().count() < MIN_TITLE_CHARS {
        return Err(AppError::validation(format!(
            "title must be at least {MIN_TITLE_CHARS} characters"
        )));
    }
    let description = input.description.trim().to_string();
    if description.chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(AppError::validation(format!(
            "description must be at least {MIN_DESCRIPTION_CHARS} characters"
        )));
    }

    conn.transaction::<Report, AppError, _>(|conn| {
        let report_number = numbering::next_number(conn, numbering::REPORT_PREFIX)?;
        let new_report = NewReport {
            id: Uuid::new_v4(),
            report_number: report_number.clone(),
            title,
            description,
            report_type: input.report_type.as_str().to_string(),
            status: ReportStatus::Submitted.as_str().to_string(),
            priority: input.priority.as_str().to_string(),
            location: input.location,
            latitude: input.latitude,
            longitude: input.longitude,
            incident_date: input.incident_date,
            author_id: actor.id,
        };

        diesel::insert_into(reports::table)
            .values(&new_report)
            .execute(conn)?;

        let report: Report = reports::table.find(new_report.id).first(conn)?;

        activity::record(
            conn,
            ActivityEntry {
                activity_type: ActivityType::Create,
                action: format!("created report {report_number}"),
                description: None,
                metadata: None,
                actor_id: actor.id,
                report_id: Some(report.id),
                case_id: None,
            },
        )?;

        info!(report_id = %report.id, %report_number, "report created");
        Ok(report)
    })
}

pub fn get_report(conn: &mut PgConnection, actor: &Actor, report_id: Uuid) -> AppResult<Report> {
    let report: Report = reports::table
        .find(report_id)
        .first(conn)
        .optional()?
        .ok_or(AppError::NotFound)?;
    authorize_read(actor, &report)?;
    Ok(report)
}

pub fn list_reports(
    conn: &mut PgConnection,
    actor: &Actor,
    status: Option<ReportStatus>,
    assigned_to_me: bool,
) -> AppResult<Vec<Report>> {
    let mut query = reports::table.into_boxed();

    if actor.role == Role::Citizen {
        require(actor, Action::ReportsReadOwn)?;
        query = query.filter(reports::author_id.eq(actor.id));
    } else {
        require(actor, Action::ReportsRead)?;
    }

    if let Some(status) = status {
        query = query.filter(reports::status.eq(status.as_str()));
    }
    if assigned_to_me {
        query = query.filter(reports::assignee_id.eq(actor.id));
    }

    let rows = query.order(reports::created_at.desc()).load(conn)?;
    Ok(rows)
}

pub fn update_status(
    conn: &mut PgConnection,
    actor: &Actor,
    report_id: Uuid,
    new_status: ReportStatus,
    expected: Option<ReportStatus>,
) -> AppResult<Report> {
    conn.transaction::<Report, AppError, _>(|conn| {
        // Row lock before any check: concurrent writers serialize here and
        // each sees the other's committed status.
        let report: Report = reports::table
            .find(report_id)
            .for_update()
            .first(conn)
            .optional()?
            .ok_or(AppError::NotFound)?;

        let current = parse_status(&report.status)?;

        let allowed = can_perform(actor.role, Action::ReportsUpdate)
            || (actor.role == Role::Citizen
                && report.author_id == actor.id
                && current == ReportStatus::Submitted);
        if !allowed {
            return Err(AppError::permission(
                "not permitted to change this report's status",
            ));
        }

        if let Some(expected) = expected {
            if expected != current {
                return Err(AppError::ConcurrentModification);
            }
        }

        if !current.can_transition_to(new_status) {
            return Err(AppError::invalid_transition(
                current.as_str(),
                new_status.as_str(),
            ));
        }

        diesel::update(reports::table.find(report_id))
            .set((
                reports::status.eq(new_status.as_str()),
                reports::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;

        let updated: Report = reports::table.find(report_id).first(conn)?;

        activity::record(
            conn,
            ActivityEntry {
                activity_type: ActivityType::StatusChange,
                action: format!(
                    "changed report {} from {} to {}",
                    report.report_number,
                    current.as_str(),
                    new_status.as_str()
                ),
                description: None,
                metadata: Some(ActivityMetadata::StatusChange {
                    old: current.as_str().to_string(),
                    new: new_status.as_str().to_string(),
                }),
                actor_id: actor.id,
                report_id: Some(report_id),
                case_id: None,
            },
        )?;

        if new_status == ReportStatus::InProgress {
            if let Some(assignee_id) = updated.assignee_id {
                if assignee_id != actor.id {
                    notify::dispatch(
                        conn,
                        NotificationParams {
                            kind: NotificationType::StatusChange,
                            title: "Report in progress".to_string(),
                            message: format!(
                                "Report {} you are assigned to is now in progress",
                                updated.report_number
                            ),
                            link: Some(format!("/reports/{report_id}")),
                            recipient: assignee_id,
                        },
                    )?;
                }
            }
        }

        Ok(updated)
    })
}

pub fn assign(
    conn: &mut PgConnection,
    actor: &Actor,
    report_id: Uuid,
    assignee_id: Uuid,
) -> AppResult<Report> {
    require(actor, Action::ReportsAssign)?;

    conn.transaction::<Report, AppError, _>(|conn| {
        let report: Report = reports::table
            .find(report_id)
            .for_update()
            .first(conn)
            .optional()?
            .ok_or(AppError::NotFound)?;

        let assignee = load_active_user(conn, assignee_id)?;

        diesel::update(reports::table.find(report_id))
            .set((
                reports::assignee_id.eq(Some(assignee_id)),
                reports::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;

        let updated: Report = reports::table.find(report_id).first(conn)?;

        activity::record(
            conn,
            ActivityEntry {
                activity_type: ActivityType::Assign,
                action: format!("assigned report {} to {}", report.report_number, assignee.name),
                description: None,
                metadata: Some(ActivityMetadata::Assignment { assignee_id }),
                actor_id: actor.id,
                report_id: Some(report_id),
                case_id: None,
            },
        )?;

        if assignee_id != actor.id {
            notify::dispatch(
                conn,
                NotificationParams {
                    kind: NotificationType::Assignment,
                    title: "Report assigned to you".to_string(),
                    message: format!("You were assigned report {}", report.report_number),
                    link: Some(format!("/reports/{report_id}")),
                    recipient: assignee_id,
                },
            )?;
        }

        Ok(updated)
    })
}

pub enum EscalateTarget {
    NewCase(super::cases::CreateCaseInput),
    Existing(Uuid),
}

/// Escalates a report into a case. Linking the report to the case it is
/// already in is a no-op; linking to a different case fails unless the
/// actor is an admin, in which case the link is moved and the move is
/// recorded on the audit trail.
pub fn escalate_to_case(
    conn: &mut PgConnection,
    actor: &Actor,
    report_id: Uuid,
    target: EscalateTarget,
) -> AppResult<Case> {
    require(actor, Action::ReportsEscalate)?;

    conn.transaction::<Case, AppError, _>(|conn| {
        let report: Report = reports::table
            .find(report_id)
            .for_update()
            .first(conn)
            .optional()?
            .ok_or(AppError::NotFound)?;

        let case = match target {
            EscalateTarget::Existing(case_id) => {
                let case: Case = cases::table
                    .find(case_id)
                    .filter(cases::deleted_at.is_null())
                    .first(conn)
                    .optional()?
                    .ok_or(AppError::NotFound)?;
                case
            }
            EscalateTarget::NewCase(input) => super::cases::create_case_tx(conn, actor, input)?,
        };

        let existing: Option<CaseReport> = case_reports::table
            .filter(case_reports::report_id.eq(report_id))
            .first(conn)
            .optional()?;

        match existing {
            Some(link) if link.case_id == case.id => {
                // Already escalated to this case.
                return Ok(case);
            }
            Some(link) => {
                if actor.role != Role::Admin {
                    let linked_case: Case = cases::table.find(link.case_id).first(conn)?;
                    return Err(AppError::AlreadyLinked {
                        case_number: linked_case.case_number,
                    });
                }

                diesel::delete(
                    case_reports::table
                        .filter(case_reports::case_id.eq(link.case_id))
                        .filter(case_reports::report_id.eq(report_id)),
                )
                .execute(conn)?;

                diesel::insert_into(case_reports::table)
                    .values(&NewCaseReport {
                        case_id: case.id,
                        report_id,
                        linked_by: actor.id,
                    })
                    .execute(conn)?;

                activity::record(
                    conn,
                    ActivityEntry {
                        activity_type: ActivityType::Escalate,
                        action: format!(
                            "moved report {} to case {}",
                            report.report_number, case.case_number
                        ),
                        description: None,
                        metadata: Some(ActivityMetadata::Relink {
                            from_case_id: link.case_id,
                            to_case_id: case.id,
                        }),
                        actor_id: actor.id,
                        report_id: Some(report_id),
                        case_id: Some(case.id),
                    },
                )?;
            }
            None => {
                diesel::insert_into(case_reports::table)
                    .values(&NewCaseReport {
                        case_id: case.id,
                        report_id,
                        linked_by: actor.id,
                    })
                    .execute(conn)?;

                activity::record(
                    conn,
                    ActivityEntry {
                        activity_type: ActivityType::Escalate,
                        action: format!(
                            "escalated report {} to case {}",
                            report.report_number, case.case_number
                        ),
                        description: None,
                        metadata: Some(ActivityMetadata::Escalation {
                            case_id: case.id,
                            case_number: case.case_number.clone(),
                        }),
                        actor_id: actor.id,
                        report_id: Some(report_id),
                        case_id: Some(case.id),
                    },
                )?;
            }
        }

        Ok(case)
    })
}

fn authorize_read(actor: &Actor, report: &Report) -> AppResult<()> {
    if actor.role == Role::Citizen {
        require(actor, Action::ReportsReadOwn)?;
        if report.author_id != actor.id {
            return Err(AppError::permission("citizens may only read their own reports"));
        }
        Ok(())
    } else {
        require(actor, Action::ReportsRead)
    }
}

pub(crate) fn parse_status(value: &str) -> AppResult<ReportStatus> {
    ReportStatus::parse(value)
        .ok_or_else(|| AppError::internal(format!("unknown report status in store: {value}")))
}
