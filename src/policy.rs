use crate::domain::Role;

/// Capabilities checked by the lifecycle engine before any mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ReportsCreate,
    ReportsRead,
    ReportsReadOwn,
    ReportsUpdate,
    ReportsAssign,
    ReportsEscalate,
    CasesCreate,
    CasesRead,
    CasesUpdate,
    CasesDelete,
    EvidenceCreate,
    EvidenceRead,
    EvidenceUpdate,
    NotesCreate,
    NotesRead,
    AnalysisRequest,
    AnalysisRead,
    AnalysisIngest,
    StatsRead,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ReportsCreate => "reports.create",
            Action::ReportsRead => "reports.read",
            Action::ReportsReadOwn => "reports.read.own",
            Action::ReportsUpdate => "reports.update",
            Action::ReportsAssign => "reports.assign",
            Action::ReportsEscalate => "reports.escalate",
            Action::CasesCreate => "cases.create",
            Action::CasesRead => "cases.read",
            Action::CasesUpdate => "cases.update",
            Action::CasesDelete => "cases.delete",
            Action::EvidenceCreate => "evidence.create",
            Action::EvidenceRead => "evidence.read",
            Action::EvidenceUpdate => "evidence.update",
            Action::NotesCreate => "notes.create",
            Action::NotesRead => "notes.read",
            Action::AnalysisRequest => "analysis.request",
            Action::AnalysisRead => "analysis.read",
            Action::AnalysisIngest => "analysis.ingest",
            Action::StatsRead => "stats.read",
        }
    }
}

/// Pure capability check. Admin holds every capability; the other roles
/// carry an explicit allow-list. Holds no state and must never consult the
/// store.
pub fn can_perform(role: Role, action: Action) -> bool {
    use Action::*;
    match role {
        Role::Admin => true,
        Role::Officer => matches!(
            action,
            ReportsCreate
                | ReportsRead
                | ReportsUpdate
                | ReportsAssign
                | ReportsEscalate
                | CasesCreate
                | CasesRead
                | CasesUpdate
                | EvidenceCreate
                | EvidenceRead
                | EvidenceUpdate
                | NotesCreate
                | NotesRead
                | AnalysisRequest
                | AnalysisRead
                | StatsRead
        ),
        Role::Analyst => matches!(
            action,
            ReportsRead
                | ReportsUpdate
                | EvidenceRead
                | NotesCreate
                | NotesRead
                | AnalysisRequest
                | AnalysisRead
                | AnalysisIngest
                | StatsRead
        ),
        Role::Prosecutor => matches!(
            action,
            ReportsRead
                | CasesRead
                | CasesUpdate
                | EvidenceRead
                | NotesCreate
                | NotesRead
                | AnalysisRead
                | StatsRead
        ),
        Role::Citizen => matches!(action, ReportsCreate | ReportsReadOwn),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_has_wildcard() {
        for action in [
            Action::ReportsAssign,
            Action::CasesDelete,
            Action::AnalysisIngest,
            Action::EvidenceUpdate,
        ] {
            assert!(can_perform(Role::Admin, action), "{}", action.as_str());
        }
    }

    #[test]
    fn officer_allow_list() {
        assert!(can_perform(Role::Officer, Action::ReportsAssign));
        assert!(can_perform(Role::Officer, Action::ReportsEscalate));
        assert!(can_perform(Role::Officer, Action::EvidenceCreate));
        assert!(!can_perform(Role::Officer, Action::CasesDelete));
        assert!(!can_perform(Role::Officer, Action::AnalysisIngest));
    }

    #[test]
    fn citizen_is_limited_to_own_reports() {
        assert!(can_perform(Role::Citizen, Action::ReportsCreate));
        assert!(can_perform(Role::Citizen, Action::ReportsReadOwn));
        assert!(!can_perform(Role::Citizen, Action::ReportsRead));
        assert!(!can_perform(Role::Citizen, Action::ReportsUpdate));
        assert!(!can_perform(Role::Citizen, Action::ReportsAssign));
        assert!(!can_perform(Role::Citizen, Action::EvidenceCreate));
    }

    #[test]
    fn analyst_may_ingest_worker_results() {
        assert!(can_perform(Role::Analyst, Action::AnalysisIngest));
        assert!(!can_perform(Role::Prosecutor, Action::AnalysisIngest));
        assert!(!can_perform(Role::Citizen, Action::AnalysisIngest));
    }

    #[test]
    fn prosecutor_works_cases_not_reports() {
        assert!(can_perform(Role::Prosecutor, Action::CasesUpdate));
        assert!(can_perform(Role::Prosecutor, Action::ReportsRead));
        assert!(!can_perform(Role::Prosecutor, Action::ReportsUpdate));
        assert!(!can_perform(Role::Prosecutor, Action::CasesCreate));
    }
}
