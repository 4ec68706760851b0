use chrono::{NaiveDateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use tracing::info;
use uuid::Uuid;

use crate::activity::{self, ActivityEntry};
use crate::domain::{ActivityMetadata, ActivityType, CaseStatus, NotificationType, Priority};
use crate::error::{AppError, AppResult};
use crate::models::{Case, NewCase, NewCaseReport, NewCaseTeamMember, Report};
use crate::notify::{self, NotificationParams};
use crate::numbering;
use crate::policy::Action;
use crate::schema::{case_reports, case_team, cases, reports};

use super::{load_active_user, require, Actor};

const MIN_TITLE_CHARS: usize = 5;
const MIN_DESCRIPTION_CHARS: usize = 20;

pub struct CreateCaseInput {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub owner_id: Option<Uuid>,
}

pub fn create_case(
    conn: &mut PgConnection,
    actor: &Actor,
    input: CreateCaseInput,
) -> AppResult<Case> {
    conn.transaction::<Case, AppError, _>(|conn| create_case_tx(conn, actor, input))
}

/// Transaction body shared with report escalation, which creates the case
/// and links the report atomically.
pub(crate) fn create_case_tx(
    conn: &mut PgConnection,
    actor: &Actor,
    input: CreateCaseInput,
) -> AppResult<Case> {
    require(actor, Action::CasesCreate)?;

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

    let owner_id = match input.owner_id {
        Some(owner_id) => load_active_user(conn, owner_id)?.id,
        None => actor.id,
    };

    let case_number = numbering::next_number(conn, numbering::CASE_PREFIX)?;
    let new_case = NewCase {
        id: Uuid::new_v4(),
        case_number: case_number.clone(),
        title,
        description,
        status: CaseStatus::Open.as_str().to_string(),
        priority: input.priority.as_str().to_string(),
        owner_id,
    };

    diesel::insert_into(cases::table)
        .values(&new_case)
        .execute(conn)?;

    let case: Case = cases::table.find(new_case.id).first(conn)?;

    activity::record(
        conn,
        ActivityEntry {
            activity_type: ActivityType::Create,
            action: format!("opened case {case_number}"),
            description: None,
            metadata: None,
            actor_id: actor.id,
            report_id: None,
            case_id: Some(case.id),
        },
    )?;

    info!(case_id = %case.id, %case_number, "case opened");
    Ok(case)
}

pub fn get_case(conn: &mut PgConnection, actor: &Actor, case_id: Uuid) -> AppResult<Case> {
    require(actor, Action::CasesRead)?;
    find_live_case(conn, case_id)
}

pub fn list_cases(
    conn: &mut PgConnection,
    actor: &Actor,
    status: Option<CaseStatus>,
) -> AppResult<Vec<Case>> {
    require(actor, Action::CasesRead)?;
    let mut query = cases::table
        .filter(cases::deleted_at.is_null())
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(cases::status.eq(status.as_str()));
    }
    let rows = query.order(cases::created_at.desc()).load(conn)?;
    Ok(rows)
}

pub fn update_status(
    conn: &mut PgConnection,
    actor: &Actor,
    case_id: Uuid,
    new_status: CaseStatus,
    expected: Option<CaseStatus>,
) -> AppResult<Case> {
    require(actor, Action::CasesUpdate)?;

    conn.transaction::<Case, AppError, _>(|conn| {
        let case: Case = cases::table
            .find(case_id)
            .filter(cases::deleted_at.is_null())
            .for_update()
            .first(conn)
            .optional()?
            .ok_or(AppError::NotFound)?;

        let current = parse_status(&case.status)?;

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

        diesel::update(cases::table.find(case_id))
            .set((
                cases::status.eq(new_status.as_str()),
                cases::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;

        let updated: Case = cases::table.find(case_id).first(conn)?;

        activity::record(
            conn,
            ActivityEntry {
                activity_type: ActivityType::StatusChange,
                action: format!(
                    "changed case {} from {} to {}",
                    case.case_number,
                    current.as_str(),
                    new_status.as_str()
                ),
                description: None,
                metadata: Some(ActivityMetadata::StatusChange {
                    old: current.as_str().to_string(),
                    new: new_status.as_str().to_string(),
                }),
                actor_id: actor.id,
                report_id: None,
                case_id: Some(case_id),
            },
        )?;

        // Owner and every team member hear about every status change,
        // except the actor themselves.
        for recipient in notification_recipients(conn, &updated)? {
            if recipient == actor.id {
                continue;
            }
            notify::dispatch(
                conn,
                NotificationParams {
                    kind: NotificationType::StatusChange,
                    title: "Case status changed".to_string(),
                    message: format!(
                        "Case {} moved from {} to {}",
                        updated.case_number,
                        current.as_str(),
                        new_status.as_str()
                    ),
                    link: Some(format!("/cases/{case_id}")),
                    recipient,
                },
            )?;
        }

        Ok(updated)
    })
}

pub fn add_team_member(
    conn: &mut PgConnection,
    actor: &Actor,
    case_id: Uuid,
    user_id: Uuid,
) -> AppResult<()> {
    require(actor, Action::CasesUpdate)?;

    conn.transaction::<(), AppError, _>(|conn| {
        let case = find_live_case(conn, case_id)?;
        let member = load_active_user(conn, user_id)?;

        let inserted = diesel::insert_into(case_team::table)
            .values(&NewCaseTeamMember {
                case_id,
                user_id,
                added_by: actor.id,
            })
            .on_conflict_do_nothing()
            .execute(conn)?;

        // Already on the team: nothing changed, nothing to audit.
        if inserted == 0 {
            return Ok(());
        }

        activity::record(
            conn,
            ActivityEntry {
                activity_type: ActivityType::Assign,
                action: format!("added {} to case {}", member.name, case.case_number),
                description: None,
                metadata: Some(ActivityMetadata::TeamChange { member_id: user_id }),
                actor_id: actor.id,
                report_id: None,
                case_id: Some(case_id),
            },
        )?;

        if user_id != actor.id {
            notify::dispatch(
                conn,
                NotificationParams {
                    kind: NotificationType::Assignment,
                    title: "Added to case team".to_string(),
                    message: format!("You were added to the team of case {}", case.case_number),
                    link: Some(format!("/cases/{case_id}")),
                    recipient: user_id,
                },
            )?;
        }

        Ok(())
    })
}

pub fn remove_team_member(
    conn: &mut PgConnection,
    actor: &Actor,
    case_id: Uuid,
    user_id: Uuid,
) -> AppResult<()> {
    require(actor, Action::CasesUpdate)?;

    conn.transaction::<(), AppError, _>(|conn| {
        let case = find_live_case(conn, case_id)?;

        let deleted = diesel::delete(
            case_team::table
                .filter(case_team::case_id.eq(case_id))
                .filter(case_team::user_id.eq(user_id)),
        )
        .execute(conn)?;

        if deleted == 0 {
            return Ok(());
        }

        activity::record(
            conn,
            ActivityEntry {
                activity_type: ActivityType::Update,
                action: format!("removed a member from case {}", case.case_number),
                description: None,
                metadata: Some(ActivityMetadata::TeamChange { member_id: user_id }),
                actor_id: actor.id,
                report_id: None,
                case_id: Some(case_id),
            },
        )?;

        Ok(())
    })
}

/// Links a report to the case. Idempotent: linking an already-linked
/// report is a no-op.
pub fn add_report(
    conn: &mut PgConnection,
    actor: &Actor,
    case_id: Uuid,
    report_id: Uuid,
) -> AppResult<()> {
    require(actor, Action::CasesUpdate)?;

    conn.transaction::<(), AppError, _>(|conn| {
        let case = find_live_case(conn, case_id)?;
        let report: Report = reports::table
            .find(report_id)
            .first(conn)
            .optional()?
            .ok_or(AppError::NotFound)?;

        let inserted = diesel::insert_into(case_reports::table)
            .values(&NewCaseReport {
                case_id,
                report_id,
                linked_by: actor.id,
            })
            .on_conflict_do_nothing()
            .execute(conn)?;

        if inserted == 0 {
            return Ok(());
        }

        activity::record(
            conn,
            ActivityEntry {
                activity_type: ActivityType::Update,
                action: format!(
                    "linked report {} to case {}",
                    report.report_number, case.case_number
                ),
                description: None,
                metadata: None,
                actor_id: actor.id,
                report_id: Some(report_id),
                case_id: Some(case_id),
            },
        )?;

        Ok(())
    })
}

pub fn set_court_date(
    conn: &mut PgConnection,
    actor: &Actor,
    case_id: Uuid,
    court_date: Option<NaiveDateTime>,
) -> AppResult<Case> {
    require(actor, Action::CasesUpdate)?;

    conn.transaction::<Case, AppError, _>(|conn| {
        let case = find_live_case(conn, case_id)?;

        diesel::update(cases::table.find(case_id))
            .set((
                cases::court_date.eq(court_date),
                cases::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;

        let updated: Case = cases::table.find(case_id).first(conn)?;

        activity::record(
            conn,
            ActivityEntry {
                activity_type: ActivityType::Update,
                action: match court_date {
                    Some(_) => format!("set court date for case {}", case.case_number),
                    None => format!("cleared court date for case {}", case.case_number),
                },
                description: None,
                metadata: Some(ActivityMetadata::CourtDate {
                    court_date: court_date.map(|dt| dt.and_utc().to_rfc3339()),
                }),
                actor_id: actor.id,
                report_id: None,
                case_id: Some(case_id),
            },
        )?;

        Ok(updated)
    })
}

pub struct UpdateLegalInput {
    pub legal_status: Option<String>,
    pub verdict: Option<String>,
}

/// Records the legal standing of a case as proceedings advance. Both
/// fields are free-form text supplied by the prosecution side.
pub fn update_legal(
    conn: &mut PgConnection,
    actor: &Actor,
    case_id: Uuid,
    input: UpdateLegalInput,
) -> AppResult<Case> {
    require(actor, Action::CasesUpdate)?;

    conn.transaction::<Case, AppError, _>(|conn| {
        let case = find_live_case(conn, case_id)?;

        diesel::update(cases::table.find(case_id))
            .set((
                cases::legal_status.eq(input.legal_status),
                cases::verdict.eq(input.verdict),
                cases::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;

        let updated: Case = cases::table.find(case_id).first(conn)?;

        activity::record(
            conn,
            ActivityEntry {
                activity_type: ActivityType::Update,
                action: format!("updated legal standing of case {}", case.case_number),
                description: None,
                metadata: None,
                actor_id: actor.id,
                report_id: None,
                case_id: Some(case_id),
            },
        )?;

        Ok(updated)
    })
}

/// Soft-deletes a case. Evidence, notes, linked reports and the audit
/// trail keep their references; every read path filters on `deleted_at`.
pub fn delete_case(conn: &mut PgConnection, actor: &Actor, case_id: Uuid) -> AppResult<()> {
    require(actor, Action::CasesDelete)?;

    conn.transaction::<(), AppError, _>(|conn| {
        let case = find_live_case(conn, case_id)?;

        diesel::update(cases::table.find(case_id))
            .set((
                cases::deleted_at.eq(Some(Utc::now().naive_utc())),
                cases::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;

        activity::record(
            conn,
            ActivityEntry {
                activity_type: ActivityType::Delete,
                action: format!("deleted case {}", case.case_number),
                description: None,
                metadata: None,
                actor_id: actor.id,
                report_id: None,
                case_id: Some(case_id),
            },
        )?;

        Ok(())
    })
}

pub fn team_member_ids(conn: &mut PgConnection, case_id: Uuid) -> AppResult<Vec<Uuid>> {
    let ids = case_team::table
        .filter(case_team::case_id.eq(case_id))
        .select(case_team::user_id)
        .load(conn)?;
    Ok(ids)
}

pub fn linked_report_ids(conn: &mut PgConnection, case_id: Uuid) -> AppResult<Vec<Uuid>> {
    let ids = case_reports::table
        .filter(case_reports::case_id.eq(case_id))
        .select(case_reports::report_id)
        .load(conn)?;
    Ok(ids)
}

fn notification_recipients(conn: &mut PgConnection, case: &Case) -> AppResult<Vec<Uuid>> {
    let mut recipients = team_member_ids(conn, case.id)?;
    if !recipients.contains(&case.owner_id) {
        recipients.push(case.owner_id);
    }
    Ok(recipients)
}

fn find_live_case(conn: &mut PgConnection, case_id: Uuid) -> AppResult<Case> {
    let case: Case = cases::table
        .find(case_id)
        .filter(cases::deleted_at.is_null())
        .first(conn)
        .optional()?
        .ok_or(AppError::NotFound)?;
    Ok(case)
}

pub(crate) fn parse_status(value: &str) -> AppResult<CaseStatus> {
    CaseStatus::parse(value)
        .ok_or_else(|| AppError::internal(format!("unknown case status in store: {value}")))
}
