use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Officer,
    Analyst,
    Prosecutor,
    Admin,
    Citizen,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Officer => "officer",
            Role::Analyst => "analyst",
            Role::Prosecutor => "prosecutor",
            Role::Admin => "admin",
            Role::Citizen => "citizen",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "officer" => Some(Role::Officer),
            "analyst" => Some(Role::Analyst),
            "prosecutor" => Some(Role::Prosecutor),
            "admin" => Some(Role::Admin),
            "citizen" => Some(Role::Citizen),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Submitted,
    UnderReview,
    InProgress,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Submitted => "submitted",
            ReportStatus::UnderReview => "under_review",
            ReportStatus::InProgress => "in_progress",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Dismissed => "dismissed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "submitted" => Some(ReportStatus::Submitted),
            "under_review" => Some(ReportStatus::UnderReview),
            "in_progress" => Some(ReportStatus::InProgress),
            "resolved" => Some(ReportStatus::Resolved),
            "dismissed" => Some(ReportStatus::Dismissed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Resolved | ReportStatus::Dismissed)
    }

    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        use ReportStatus::*;
        match (self, next) {
            (Submitted, UnderReview) => true,
            (UnderReview, InProgress) => true,
            (InProgress, Resolved) => true,
            (UnderReview, Dismissed) | (InProgress, Dismissed) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Open,
    InProgress,
    PendingReview,
    WithProsecutor,
    InCourt,
    Closed,
    Dismissed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Open => "open",
            CaseStatus::InProgress => "in_progress",
            CaseStatus::PendingReview => "pending_review",
            CaseStatus::WithProsecutor => "with_prosecutor",
            CaseStatus::InCourt => "in_court",
            CaseStatus::Closed => "closed",
            CaseStatus::Dismissed => "dismissed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(CaseStatus::Open),
            "in_progress" => Some(CaseStatus::InProgress),
            "pending_review" => Some(CaseStatus::PendingReview),
            "with_prosecutor" => Some(CaseStatus::WithProsecutor),
            "in_court" => Some(CaseStatus::InCourt),
            "closed" => Some(CaseStatus::Closed),
            "dismissed" => Some(CaseStatus::Dismissed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseStatus::Closed | CaseStatus::Dismissed)
    }

    pub fn can_transition_to(&self, next: CaseStatus) -> bool {
        use CaseStatus::*;
        if self.is_terminal() {
            return false;
        }
        if next == Dismissed {
            return true;
        }
        match (self, next) {
            (Open, InProgress) => true,
            (InProgress, PendingReview) => true,
            (PendingReview, WithProsecutor) => true,
            (WithProsecutor, InCourt) => true,
            (InCourt, Closed) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "critical" => Some(Priority::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    WaterPollution,
    AirPollution,
    IllegalDumping,
    Deforestation,
    WildlifeHarm,
    NoiseViolation,
    Other,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::WaterPollution => "water_pollution",
            ReportType::AirPollution => "air_pollution",
            ReportType::IllegalDumping => "illegal_dumping",
            ReportType::Deforestation => "deforestation",
            ReportType::WildlifeHarm => "wildlife_harm",
            ReportType::NoiseViolation => "noise_violation",
            ReportType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "water_pollution" => Some(ReportType::WaterPollution),
            "air_pollution" => Some(ReportType::AirPollution),
            "illegal_dumping" => Some(ReportType::IllegalDumping),
            "deforestation" => Some(ReportType::Deforestation),
            "wildlife_harm" => Some(ReportType::WildlifeHarm),
            "noise_violation" => Some(ReportType::NoiseViolation),
            "other" => Some(ReportType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    Photo,
    Video,
    Document,
    Sample,
    Testimony,
    Other,
}

impl EvidenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceType::Photo => "photo",
            EvidenceType::Video => "video",
            EvidenceType::Document => "document",
            EvidenceType::Sample => "sample",
            EvidenceType::Testimony => "testimony",
            EvidenceType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "photo" => Some(EvidenceType::Photo),
            "video" => Some(EvidenceType::Video),
            "document" => Some(EvidenceType::Document),
            "sample" => Some(EvidenceType::Sample),
            "testimony" => Some(EvidenceType::Testimony),
            "other" => Some(EvidenceType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteType {
    General,
    Investigation,
    Legal,
}

impl NoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteType::General => "general",
            NoteType::Investigation => "investigation",
            NoteType::Legal => "legal",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "general" => Some(NoteType::General),
            "investigation" => Some(NoteType::Investigation),
            "legal" => Some(NoteType::Legal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Create,
    Update,
    StatusChange,
    Assign,
    Escalate,
    Analysis,
    Delete,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Create => "create",
            ActivityType::Update => "update",
            ActivityType::StatusChange => "status_change",
            ActivityType::Assign => "assign",
            ActivityType::Escalate => "escalate",
            ActivityType::Analysis => "analysis",
            ActivityType::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Assignment,
    StatusChange,
    Deadline,
    Analysis,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Assignment => "assignment",
            NotificationType::StatusChange => "status_change",
            NotificationType::Deadline => "deadline",
            NotificationType::Analysis => "analysis",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    ImageClassification,
    ObjectDetection,
    DocumentExtraction,
    RiskAssessment,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::ImageClassification => "image_classification",
            AnalysisType::ObjectDetection => "object_detection",
            AnalysisType::DocumentExtraction => "document_extraction",
            AnalysisType::RiskAssessment => "risk_assessment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "image_classification" => Some(AnalysisType::ImageClassification),
            "object_detection" => Some(AnalysisType::ObjectDetection),
            "document_extraction" => Some(AnalysisType::DocumentExtraction),
            "risk_assessment" => Some(AnalysisType::RiskAssessment),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Queued => "queued",
            AnalysisStatus::Processing => "processing",
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Failed => "failed",
            AnalysisStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "queued" => Some(AnalysisStatus::Queued),
            "processing" => Some(AnalysisStatus::Processing),
            "completed" => Some(AnalysisStatus::Completed),
            "failed" => Some(AnalysisStatus::Failed),
            "cancelled" => Some(AnalysisStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AnalysisStatus::Completed | AnalysisStatus::Failed | AnalysisStatus::Cancelled
        )
    }
}

/// Per-kind metadata attached to an activity record. Serialized to the
/// `metadata` jsonb column so each activity type has a statically known
/// payload shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityMetadata {
    StatusChange { old: String, new: String },
    Assignment { assignee_id: Uuid },
    TeamChange { member_id: Uuid },
    Escalation { case_id: Uuid, case_number: String },
    Relink { from_case_id: Uuid, to_case_id: Uuid },
    Analysis { job_id: Uuid, analysis_type: String, status: String },
    CourtDate { court_date: Option<String> },
}
