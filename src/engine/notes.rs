use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::activity::{self, ActivityEntry};
use crate::domain::{ActivityType, NoteType, Role};
use crate::error::{AppError, AppResult};
use crate::models::{NewNote, Note, Report};
use crate::policy::Action;
use crate::schema::{cases, notes, reports};

use super::{require, Actor};

pub struct AddNoteInput {
    pub content: String,
    pub note_type: NoteType,
    pub is_internal: bool,
    pub report_id: Option<Uuid>,
    pub case_id: Option<Uuid>,
}

pub fn add_note(conn: &mut PgConnection, actor: &Actor, input: AddNoteInput) -> AppResult<Note> {
    require(actor, Action::NotesCreate)?;

    if input.content.trim().is_empty() {
        return Err(AppError::validation("content must not be empty"));
    }
    if input.report_id.is_none() && input.case_id.is_none() {
        return Err(AppError::validation(
            "note must be attached to a report or a case",
        ));
    }

    conn.transaction::<Note, AppError, _>(|conn| {
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

        let new_note = NewNote {
            id: Uuid::new_v4(),
            content: input.content.trim().to_string(),
            note_type: input.note_type.as_str().to_string(),
            is_internal: input.is_internal,
            author_id: actor.id,
            report_id: input.report_id,
            case_id: input.case_id,
        };

        diesel::insert_into(notes::table)
            .values(&new_note)
            .execute(conn)?;

        let note: Note = notes::table.find(new_note.id).first(conn)?;

        activity::record(
            conn,
            ActivityEntry {
                activity_type: ActivityType::Create,
                action: "added a note".to_string(),
                description: None,
                metadata: None,
                actor_id: actor.id,
                report_id: note.report_id,
                case_id: note.case_id,
            },
        )?;

        Ok(note)
    })
}

/// Notes on a report the actor is already authorized to read. Internal
/// notes never reach citizen readers; the filter lives here rather than in
/// the HTTP layer so no other caller can forget it.
pub fn list_for_report(
    conn: &mut PgConnection,
    actor: &Actor,
    report: &Report,
) -> AppResult<Vec<Note>> {
    let mut query = notes::table
        .filter(notes::report_id.eq(report.id))
        .into_boxed();

    if actor.role == Role::Citizen {
        if report.author_id != actor.id {
            return Err(AppError::permission("citizens may only read their own reports"));
        }
        query = query.filter(notes::is_internal.eq(false));
    } else {
        require(actor, Action::NotesRead)?;
    }

    let rows = query.order(notes::created_at.desc()).load(conn)?;
    Ok(rows)
}

pub fn list_for_case(conn: &mut PgConnection, actor: &Actor, case_id: Uuid) -> AppResult<Vec<Note>> {
    require(actor, Action::NotesRead)?;
    let rows = notes::table
        .filter(notes::case_id.eq(case_id))
        .order(notes::created_at.desc())
        .load(conn)?;
    Ok(rows)
}
