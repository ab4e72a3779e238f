//! Body state snapshot endpoints.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;

use super::state::AppState;
use super::types::{ok, ApiResponse};
use crate::auth::AuthUser;
use crate::errors::{Result, ValidationErrorExt};
use crate::models::BodyState;
use crate::repo::body_states;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct BodyStateRequest {
    pub health: i64,
    pub energy: i64,
    pub note: Option<String>,
}

fn validate(req: &BodyStateRequest) -> Result<()> {
    validation::validate_points(req.health).map_validation_err("health")?;
    validation::validate_points(req.energy).map_validation_err("energy")?;
    if let Some(note) = &req.note {
        validation::validate_description(note).map_validation_err("note")?;
    }
    Ok(())
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<BodyStateRequest>,
) -> Result<Json<ApiResponse<BodyState>>> {
    validate(&req)?;
    let body_state = {
        let conn = state.db.conn();
        body_states::create(&conn, auth.id, req.health, req.energy, req.note.as_deref())?
    };
    Ok(ok(body_state))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<BodyState>>>> {
    let listing = {
        let conn = state.db.conn();
        body_states::list(&conn, auth.id)?
    };
    Ok(ok(listing))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<BodyState>>> {
    let body_state = {
        let conn = state.db.conn();
        body_states::get_owned(&conn, auth.id, id)?
    };
    Ok(ok(body_state))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<BodyStateRequest>,
) -> Result<Json<ApiResponse<BodyState>>> {
    validate(&req)?;
    let body_state = {
        let conn = state.db.conn();
        body_states::update(&conn, auth.id, id, req.health, req.energy, req.note.as_deref())?
    };
    Ok(ok(body_state))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    {
        let conn = state.db.conn();
        body_states::delete(&conn, auth.id, id)?;
    }
    Ok(ok(serde_json::json!({ "deleted": id })))
}
