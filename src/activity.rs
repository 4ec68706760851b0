use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{ActivityMetadata, ActivityType};
use crate::error::AppResult;
use crate::models::{Activity, NewActivity};
use crate::schema::activities;

/// One audit entry to append. Built by engine operations only; there is no
/// update or delete path for activities anywhere in the crate.
pub struct ActivityEntry {
    pub activity_type: ActivityType,
    pub action: String,
    pub description: Option<String>,
    pub metadata: Option<ActivityMetadata>,
    pub actor_id: Uuid,
    pub report_id: Option<Uuid>,
    pub case_id: Option<Uuid>,
}

/// Appends an audit record inside the caller's transaction. A failure here
/// aborts the whole operation so no mutation can commit without its audit
/// entry.
pub fn record(conn: &mut PgConnection, entry: ActivityEntry) -> AppResult<Activity> {
    let metadata = entry
        .metadata
        .as_ref()
        .map(serde_json::to_value)
        .transpose()?;

    let new_activity = NewActivity {
        id: Uuid::new_v4(),
        activity_type: entry.activity_type.as_str().to_string(),
        action: entry.action,
        description: entry.description,
        metadata,
        user_id: entry.actor_id,
        report_id: entry.report_id,
        case_id: entry.case_id,
    };

    diesel::insert_into(activities::table)
        .values(&new_activity)
        .execute(conn)?;

    let activity = activities::table.find(new_activity.id).first(conn)?;
    Ok(activity)
}

/// Most recent activities for a report, newest first. The `seq` column
/// breaks ties between entries sharing a timestamp.
pub fn for_report(conn: &mut PgConnection, report_id: Uuid, limit: i64) -> AppResult<Vec<Activity>> {
    let rows = activities::table
        .filter(activities::report_id.eq(report_id))
        .order((activities::created_at.desc(), activities::seq.desc()))
        .limit(limit)
        .load(conn)?;
    Ok(rows)
}

pub fn for_case(conn: &mut PgConnection, case_id: Uuid, limit: i64) -> AppResult<Vec<Activity>> {
    let rows = activities::table
        .filter(activities::case_id.eq(case_id))
        .order((activities::created_at.desc(), activities::seq.desc()))
        .limit(limit)
        .load(conn)?;
    Ok(rows)
}

pub fn count_for_case(conn: &mut PgConnection, case_id: Uuid) -> AppResult<i64> {
    let count = activities::table
        .filter(activities::case_id.eq(case_id))
        .count()
        .get_result(conn)?;
    Ok(count)
}
