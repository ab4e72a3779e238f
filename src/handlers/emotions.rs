//! Emotion vocabulary endpoints.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;

use super::state::AppState;
use super::types::{ok, ApiResponse};
use crate::auth::AuthUser;
use crate::errors::{Result, ValidationErrorExt};
use crate::models::Emotion;
use crate::repo::emotions;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct EmotionRequest {
    pub name: String,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<EmotionRequest>,
) -> Result<Json<ApiResponse<Emotion>>> {
    validation::validate_name(&req.name).map_validation_err("name")?;
    let emotion = {
        let conn = state.db.conn();
        emotions::create(&conn, auth.id, &req.name)?
    };
    Ok(ok(emotion))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<Emotion>>>> {
    let listing = {
        let conn = state.db.conn();
        emotions::list(&conn, auth.id)?
    };
    Ok(ok(listing))
}

pub async fn rename(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<EmotionRequest>,
) -> Result<Json<ApiResponse<Emotion>>> {
    validation::validate_name(&req.name).map_validation_err("name")?;
    let emotion = {
        let conn = state.db.conn();
        emotions::rename(&conn, auth.id, id, &req.name)?
    };
    Ok(ok(emotion))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    {
        let conn = state.db.conn();
        emotions::delete(&conn, auth.id, id)?;
    }
    Ok(ok(serde_json::json!({ "deleted": id })))
}
