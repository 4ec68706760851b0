use chrono::{NaiveDateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::activity::{self, ActivityEntry};
use crate::domain::{ActivityType, EvidenceType};
use crate::error::{AppError, AppResult};
use crate::models::{Evidence, NewEvidence};
use crate::policy::Action;
use crate::schema::{cases, evidence, reports};

use super::{require, Actor};

pub struct CreateEvidenceInput {
    pub evidence_type: EvidenceType,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub content_hash: String,
    pub collected_at: NaiveDateTime,
    pub report_id: Option<Uuid>,
    pub case_id: Option<Uuid>,
}

/// Creates a custody-tracked evidence record. `collected_by` is the acting
/// user, and together with `collected_at` and `content_hash` it is frozen
/// at insert: no update path in this crate touches those columns. A
/// correction is a new evidence record.
pub fn create_evidence(
    conn: &mut PgConnection,
    actor: &Actor,
    input: CreateEvidenceInput,
) -> AppResult<Evidence> {
    require(actor, Action::EvidenceCreate)?;

    if input.title.trim().is_empty() {
        return Err(AppError::validation("title must not be empty"));
    }
    if input.content_hash.trim().is_empty() {
        return Err(AppError::validation("content_hash must not be empty"));
    }
    if input.report_id.is_none() && input.case_id.is_none() {
        return Err(AppError::validation(
            "evidence must be linked to a report or a case",
        ));
    }

    conn.transaction::<Evidence, AppError, _>(|conn| {
        if let Some(report_id) = input.report_id {
            let exists: i64 = reports::table
                .filter(reports::id.eq(report_id))
                .count()
                .get_result(conn)?;
            if exists == 0 {
                return Err(AppError::validation("linked report does not exist"));
            }
        }
        if let Some(case_id) = input.case_id {
            let exists: i64 = cases::table
                .filter(cases::id.eq(case_id))
                .filter(cases::deleted_at.is_null())
                .count()
                .get_result(conn)?;
            if exists == 0 {
                return Err(AppError::validation("linked case does not exist"));
            }
        }

        let new_evidence = NewEvidence {
            id: Uuid::new_v4(),
            evidence_type: input.evidence_type.as_str().to_string(),
            title: input.title.trim().to_string(),
            description: input.description,
            file_url: input.file_url,
            content_hash: input.content_hash.trim().to_lowercase(),
            collected_by: actor.id,
            collected_at: input.collected_at,
            report_id: input.report_id,
            case_id: input.case_id,
        };

        diesel::insert_into(evidence::table)
            .values(&new_evidence)
            .execute(conn)?;

        let record: Evidence = evidence::table.find(new_evidence.id).first(conn)?;

        activity::record(
            conn,
            ActivityEntry {
                activity_type: ActivityType::Create,
                action: format!("collected evidence \"{}\"", record.title),
                description: None,
                metadata: None,
                actor_id: actor.id,
                report_id: record.report_id,
                case_id: record.case_id,
            },
        )?;

        Ok(record)
    })
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = evidence)]
pub struct UpdateEvidenceChangeset {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
}

/// Updates the mutable, non-custody fields of an evidence record. The
/// changeset type cannot express `content_hash`, `collected_by` or
/// `collected_at`, so custody data is immutable by construction.
pub fn update_evidence(
    conn: &mut PgConnection,
    actor: &Actor,
    evidence_id: Uuid,
    changes: UpdateEvidenceChangeset,
) -> AppResult<Evidence> {
    require(actor, Action::EvidenceUpdate)?;

    if let Some(title) = changes.title.as_deref() {
        if title.trim().is_empty() {
            return Err(AppError::validation("title must not be empty"));
        }
    }

    conn.transaction::<Evidence, AppError, _>(|conn| {
        let existing: Evidence = evidence::table
            .find(evidence_id)
            .for_update()
            .first(conn)
            .optional()?
            .ok_or(AppError::NotFound)?;

        if changes.title.is_none() && changes.description.is_none() {
            return Ok(existing);
        }

        diesel::update(evidence::table.find(evidence_id))
            .set((&changes, evidence::updated_at.eq(Utc::now().naive_utc())))
            .execute(conn)?;

        let updated: Evidence = evidence::table.find(evidence_id).first(conn)?;

        activity::record(
            conn,
            ActivityEntry {
                activity_type: ActivityType::Update,
                action: format!("updated evidence \"{}\"", updated.title),
                description: None,
                metadata: None,
                actor_id: actor.id,
                report_id: updated.report_id,
                case_id: updated.case_id,
            },
        )?;

        Ok(updated)
    })
}

pub fn get_evidence(
    conn: &mut PgConnection,
    actor: &Actor,
    evidence_id: Uuid,
) -> AppResult<Evidence> {
    require(actor, Action::EvidenceRead)?;
    let record: Evidence = evidence::table
        .find(evidence_id)
        .first(conn)
        .optional()?
        .ok_or(AppError::NotFound)?;
    Ok(record)
}

pub fn list_evidence(
    conn: &mut PgConnection,
    actor: &Actor,
    report_id: Option<Uuid>,
    case_id: Option<Uuid>,
) -> AppResult<Vec<Evidence>> {
    require(actor, Action::EvidenceRead)?;

    let mut query = evidence::table.into_boxed();
    if let Some(report_id) = report_id {
        query = query.filter(evidence::report_id.eq(report_id));
    }
    if let Some(case_id) = case_id {
        query = query.filter(evidence::case_id.eq(case_id));
    }

    let rows = query.order(evidence::collected_at.desc()).load(conn)?;
    Ok(rows)
}
