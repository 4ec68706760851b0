use chrono::NaiveDateTime;
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::*;

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub active: bool,
    pub badge_number: Option<String>,
    pub department: Option<String>,
    pub last_login: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub active: bool,
    pub badge_number: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = reports)]
pub struct Report {
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
    pub incident_date: NaiveDateTime,
    pub author_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reports)]
pub struct NewReport {
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
    pub incident_date: NaiveDateTime,
    pub author_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = cases)]
pub struct Case {
    pub id: Uuid,
    pub case_number: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub owner_id: Uuid,
    pub court_date: Option<NaiveDateTime>,
    pub legal_status: Option<String>,
    pub verdict: Option<String>,
    pub deleted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cases)]
pub struct NewCase {
    pub id: Uuid,
    pub case_number: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub owner_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Associations)]
#[diesel(table_name = case_reports)]
#[diesel(belongs_to(Case))]
#[diesel(belongs_to(Report))]
#[diesel(primary_key(case_id, report_id))]
pub struct CaseReport {
    pub case_id: Uuid,
    pub report_id: Uuid,
    pub linked_at: NaiveDateTime,
    pub linked_by: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = case_reports)]
pub struct NewCaseReport {
    pub case_id: Uuid,
    pub report_id: Uuid,
    pub linked_by: Uuid,
}

#[derive(Debug, Clone, Queryable, Associations)]
#[diesel(table_name = case_team)]
#[diesel(belongs_to(Case))]
#[diesel(belongs_to(User))]
#[diesel(primary_key(case_id, user_id))]
pub struct CaseTeamMember {
    pub case_id: Uuid,
    pub user_id: Uuid,
    pub added_at: NaiveDateTime,
    pub added_by: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = case_team)]
pub struct NewCaseTeamMember {
    pub case_id: Uuid,
    pub user_id: Uuid,
    pub added_by: Uuid,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = evidence)]
pub struct Evidence {
    pub id: Uuid,
    pub evidence_type: String,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub content_hash: String,
    pub collected_by: Uuid,
    pub collected_at: NaiveDateTime,
    pub report_id: Option<Uuid>,
    pub case_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = evidence)]
pub struct NewEvidence {
    pub id: Uuid,
    pub evidence_type: String,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub content_hash: String,
    pub collected_by: Uuid,
    pub collected_at: NaiveDateTime,
    pub report_id: Option<Uuid>,
    pub case_id: Option<Uuid>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = notes)]
pub struct Note {
    pub id: Uuid,
    pub content: String,
    pub note_type: String,
    pub is_internal: bool,
    pub author_id: Uuid,
    pub report_id: Option<Uuid>,
    pub case_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notes)]
pub struct NewNote {
    pub id: Uuid,
    pub content: String,
    pub note_type: String,
    pub is_internal: bool,
    pub author_id: Uuid,
    pub report_id: Option<Uuid>,
    pub case_id: Option<Uuid>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = activities)]
pub struct Activity {
    pub id: Uuid,
    pub seq: i64,
    pub activity_type: String,
    pub action: String,
    pub description: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub user_id: Uuid,
    pub report_id: Option<Uuid>,
    pub case_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = activities)]
pub struct NewActivity {
    pub id: Uuid,
    pub activity_type: String,
    pub action: String,
    pub description: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub user_id: Uuid,
    pub report_id: Option<Uuid>,
    pub case_id: Option<Uuid>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = analysis_jobs)]
pub struct AnalysisJob {
    pub id: Uuid,
    pub analysis_type: String,
    pub status: String,
    pub report_id: Uuid,
    pub requested_by: Uuid,
    pub progress: i32,
    pub result: Option<serde_json::Value>,
    pub confidence: Option<f64>,
    pub detections: Option<serde_json::Value>,
    pub error: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = analysis_jobs)]
pub struct NewAnalysisJob {
    pub id: Uuid,
    pub analysis_type: String,
    pub status: String,
    pub report_id: Uuid,
    pub requested_by: Uuid,
    pub progress: i32,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = notifications)]
pub struct Notification {
    pub id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub user_id: Uuid,
    pub is_read: bool,
    pub read_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = jobs)]
pub struct Job {
    pub id: Uuid,
    pub job_type: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub attempts: i32,
    pub run_after: NaiveDateTime,
    pub last_error: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = jobs)]
pub struct NewJob {
    pub id: Uuid,
    pub job_type: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub run_after: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = refresh_tokens)]
#[diesel(belongs_to(User))]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub issued_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub revoked_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = refresh_tokens)]
pub struct NewRefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub issued_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}
