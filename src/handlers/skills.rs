//! Skill tracking endpoints, including experience progress events.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;

use super::state::AppState;
use super::types::{ok, ApiResponse};
use crate::auth::AuthUser;
use crate::errors::{Result, ValidationErrorExt};
use crate::models::Skill;
use crate::repo::skills;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct SkillRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub experience: i64,
    /// Optional journal entry that earned the experience
    pub entry_id: Option<i64>,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<SkillRequest>,
) -> Result<Json<ApiResponse<Skill>>> {
    validation::validate_name(&req.name).map_validation_err("name")?;
    let skill = {
        let conn = state.db.conn();
        skills::create(&conn, auth.id, &req.name)?
    };
    Ok(ok(skill))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<Skill>>>> {
    let listing = {
        let conn = state.db.conn();
        skills::list(&conn, auth.id)?
    };
    Ok(ok(listing))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Skill>>> {
    let skill = {
        let conn = state.db.conn();
        skills::get_owned(&conn, auth.id, id)?
    };
    Ok(ok(skill))
}

pub async fn rename(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<SkillRequest>,
) -> Result<Json<ApiResponse<Skill>>> {
    validation::validate_name(&req.name).map_validation_err("name")?;
    let skill = {
        let conn = state.db.conn();
        skills::rename(&conn, auth.id, id, &req.name)?
    };
    Ok(ok(skill))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    {
        let conn = state.db.conn();
        skills::delete(&conn, auth.id, id)?;
    }
    Ok(ok(serde_json::json!({ "deleted": id })))
}

/// Record experience gain; the response carries the recomputed level.
pub async fn add_progress(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<ProgressRequest>,
) -> Result<Json<ApiResponse<Skill>>> {
    validation::validate_experience(req.experience).map_validation_err("experience")?;

    let skill = {
        let mut conn = state.db.conn();
        skills::add_progress(&mut conn, auth.id, id, req.experience, req.entry_id)?
    };
    tracing::debug!(
        user_id = auth.id,
        skill_id = id,
        level = skill.level,
        "skill progress recorded"
    );
    Ok(ok(skill))
}
