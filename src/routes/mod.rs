use axum::http::HeaderValue;
use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{
    auth::AuthenticatedUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub mod analysis;
pub mod auth;
pub mod cases;
pub mod evidence;
pub mod health;
pub mod notifications;
pub mod reports;
pub mod stats;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| {
                    trimmed
                        .parse::<HeaderValue>()
                        .expect("invalid CORS allowed origin")
                })
            })
            .collect();

        let allow_origin = AllowOrigin::list(headers);

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    };

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me));

    let reports_routes = Router::new()
        .route("/", get(reports::list_reports).post(reports::create_report))
        .route("/:id", get(reports::get_report))
        .route("/:id/status", patch(reports::update_status))
        .route("/:id/assignee", patch(reports::assign_report))
        .route("/:id/escalate", post(reports::escalate_report))
        .route("/:id/notes", get(reports::list_notes).post(reports::add_note))
        .route("/:id/activity", get(reports::list_activity))
        .route(
            "/:id/analysis",
            get(reports::list_analysis).post(reports::request_analysis),
        );

    let cases_routes = Router::new()
        .route("/", get(cases::list_cases).post(cases::create_case))
        .route("/:id", get(cases::get_case).delete(cases::delete_case))
        .route("/:id/status", patch(cases::update_status))
        .route("/:id/team", post(cases::add_team_member))
        .route("/:id/team/:user_id", delete(cases::remove_team_member))
        .route("/:id/reports", post(cases::add_report))
        .route("/:id/court-date", patch(cases::set_court_date))
        .route("/:id/legal", patch(cases::update_legal))
        .route("/:id/notes", get(cases::list_notes).post(cases::add_note))
        .route("/:id/activity", get(cases::list_activity));

    let evidence_routes = Router::new()
        .route(
            "/",
            get(evidence::list_evidence).post(evidence::create_evidence),
        )
        .route(
            "/:id",
            get(evidence::get_evidence).patch(evidence::update_evidence),
        );

    let analysis_routes = Router::new()
        .route("/:id", get(analysis::get_job))
        .route("/:id/status", patch(analysis::update_status));

    let notifications_routes = Router::new()
        .route("/", get(notifications::list_notifications))
        .route("/:id/read", post(notifications::mark_read))
        .route("/read-all", post(notifications::mark_all_read));

    let stats_routes = Router::new()
        .route("/reports", get(stats::report_stats))
        .route("/dashboard", get(stats::dashboard_stats));

    let protected_state = state.clone();
    let protected_routes = Router::new()
        .nest("/api/reports", reports_routes)
        .nest("/api/cases", cases_routes)
        .nest("/api/evidence", evidence_routes)
        .nest("/api/analysis", analysis_routes)
        .nest("/api/notifications", notifications_routes)
        .nest("/api/stats", stats_routes)
        .layer(middleware::from_extractor_with_state::<AuthenticatedUser, _>(protected_state));

    Router::new()
        .merge(protected_routes)
        .nest("/api/auth", auth_routes)
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(cors)
}

pub(crate) fn to_iso(dt: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc).to_rfc3339()
}

pub(crate) fn parse_datetime(value: &str) -> AppResult<NaiveDateTime> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_utc())
        .map_err(|_| AppError::validation(format!("invalid RFC 3339 datetime: {value}")))
}
