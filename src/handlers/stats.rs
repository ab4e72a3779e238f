//! Aggregate analytics endpoints: overview, streaks and the heatmap.

use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use super::state::AppState;
use super::types::{ok, ApiResponse};
use crate::auth::AuthUser;
use crate::errors::Result;
use crate::stats::{self, HeatmapDay, Overview, Streak};

#[derive(Debug, Deserialize)]
pub struct HeatmapQuery {
    /// Calendar year; defaults to the trailing year ending today
    pub year: Option<i32>,
}

pub async fn overview(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Overview>>> {
    let overview = {
        let conn = state.db.conn();
        stats::overview(&conn, auth.id)?
    };
    Ok(ok(overview))
}

pub async fn streak(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Streak>>> {
    let streak = {
        let conn = state.db.conn();
        stats::streak(&conn, auth.id)?
    };
    Ok(ok(streak))
}

pub async fn heatmap(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<HeatmapQuery>,
) -> Result<Json<ApiResponse<Vec<HeatmapDay>>>> {
    let cells = {
        let conn = state.db.conn();
        stats::heatmap(&conn, auth.id, query.year)?
    };
    Ok(ok(cells))
}
