//! Circumstance snapshot endpoints.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;

use super::state::AppState;
use super::types::{ok, ApiResponse};
use crate::auth::AuthUser;
use crate::errors::{Result, ValidationErrorExt};
use crate::models::Circumstance;
use crate::repo::circumstances;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct CircumstanceRequest {
    pub name: String,
    pub location: Option<String>,
    pub description: Option<String>,
}

fn validate(req: &CircumstanceRequest) -> Result<()> {
    validation::validate_name(&req.name).map_validation_err("name")?;
    if let Some(location) = &req.location {
        validation::validate_name(location).map_validation_err("location")?;
    }
    if let Some(description) = &req.description {
        validation::validate_description(description).map_validation_err("description")?;
    }
    Ok(())
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CircumstanceRequest>,
) -> Result<Json<ApiResponse<Circumstance>>> {
    validate(&req)?;
    let circumstance = {
        let conn = state.db.conn();
        circumstances::create(
            &conn,
            auth.id,
            &req.name,
            req.location.as_deref(),
            req.description.as_deref(),
        )?
    };
    Ok(ok(circumstance))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<Circumstance>>>> {
    let listing = {
        let conn = state.db.conn();
        circumstances::list(&conn, auth.id)?
    };
    Ok(ok(listing))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Circumstance>>> {
    let circumstance = {
        let conn = state.db.conn();
        circumstances::get_owned(&conn, auth.id, id)?
    };
    Ok(ok(circumstance))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<CircumstanceRequest>,
) -> Result<Json<ApiResponse<Circumstance>>> {
    validate(&req)?;
    let circumstance = {
        let conn = state.db.conn();
        circumstances::update(
            &conn,
            auth.id,
            id,
            &req.name,
            req.location.as_deref(),
            req.description.as_deref(),
        )?
    };
    Ok(ok(circumstance))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    {
        let conn = state.db.conn();
        circumstances::delete(&conn, auth.id, id)?;
    }
    Ok(ok(serde_json::json!({ "deleted": id })))
}
