//! People endpoints.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;

use super::state::AppState;
use super::types::{ok, ApiResponse};
use crate::auth::AuthUser;
use crate::errors::{Result, ValidationErrorExt};
use crate::models::Person;
use crate::repo::people;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct PersonRequest {
    pub name: String,
    pub notes: Option<String>,
}

fn validate(req: &PersonRequest) -> Result<()> {
    validation::validate_name(&req.name).map_validation_err("name")?;
    if let Some(notes) = &req.notes {
        validation::validate_description(notes).map_validation_err("notes")?;
    }
    Ok(())
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<PersonRequest>,
) -> Result<Json<ApiResponse<Person>>> {
    validate(&req)?;
    let person = {
        let conn = state.db.conn();
        people::create(&conn, auth.id, &req.name, req.notes.as_deref())?
    };
    Ok(ok(person))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<Person>>>> {
    let listing = {
        let conn = state.db.conn();
        people::list(&conn, auth.id)?
    };
    Ok(ok(listing))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Person>>> {
    let person = {
        let conn = state.db.conn();
        people::get_owned(&conn, auth.id, id)?
    };
    Ok(ok(person))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<PersonRequest>,
) -> Result<Json<ApiResponse<Person>>> {
    validate(&req)?;
    let person = {
        let conn = state.db.conn();
        people::update(&conn, auth.id, id, &req.name, req.notes.as_deref())?
    };
    Ok(ok(person))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    {
        let conn = state.db.conn();
        people::delete(&conn, auth.id, id)?;
    }
    Ok(ok(serde_json::json!({ "deleted": id })))
}
