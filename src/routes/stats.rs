use axum::extract::{Json, State};

use crate::auth::AuthenticatedUser;
use crate::engine::Actor;
use crate::error::AppResult;
use crate::state::AppState;
use crate::stats;

pub async fn report_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<stats::ReportStats>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let stats = stats::report_stats(&mut conn, &actor)?;
    Ok(Json(stats))
}

pub async fn dashboard_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<stats::DashboardStats>> {
    let mut conn = state.db()?;
    let actor = Actor::load(&mut conn, user.user_id)?;
    let stats = stats::dashboard_stats(&mut conn, &actor, state.config.deadline_window_days)?;
    Ok(Json(stats))
}
