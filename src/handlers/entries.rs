//! Entry CRUD plus whole-set replacement of tags, people and emotions.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::state::AppState;
use super::types::{ok, ApiResponse};
use crate::auth::AuthUser;
use crate::errors::{Result, ValidationErrorExt};
use crate::models::{Entry, EntryDetail, EntryType};
use crate::repo::entries::{self, NewEntry, UpdateEntry};
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub entry_type: EntryType,
    pub title: Option<String>,
    pub content: String,
    pub body_state_id: Option<i64>,
    pub circumstance_id: Option<i64>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    pub title: Option<String>,
    pub content: String,
    pub body_state_id: Option<i64>,
    pub circumstance_id: Option<i64>,
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub entry_type: Option<EntryType>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SetTagsRequest {
    pub tag_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SetPeopleRequest {
    pub person_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SetEmotionsRequest {
    pub emotions: Vec<EmotionIntensity>,
}

#[derive(Debug, Deserialize)]
pub struct EmotionIntensity {
    pub emotion_id: i64,
    pub intensity: i64,
}

fn validate_entry_fields(title: Option<&str>, content: &str) -> Result<()> {
    if let Some(title) = title {
        validation::validate_title(title).map_validation_err("title")?;
    }
    validation::validate_content(content).map_validation_err("content")?;
    Ok(())
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<Json<ApiResponse<Entry>>> {
    validate_entry_fields(req.title.as_deref(), &req.content)?;

    let entry = {
        let conn = state.db.conn();
        entries::create(
            &conn,
            auth.id,
            &NewEntry {
                entry_type: req.entry_type,
                title: req.title,
                content: req.content,
                body_state_id: req.body_state_id,
                circumstance_id: req.circumstance_id,
                deadline: req.deadline,
            },
        )?
    };

    tracing::debug!(user_id = auth.id, entry_id = entry.id, entry_type = %entry.entry_type, "entry created");
    Ok(ok(entry))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Entry>>>> {
    let limit = validation::validate_limit(query.limit.unwrap_or(50)).map_validation_err("limit")?;
    let offset = query.offset.unwrap_or(0);

    let entries = {
        let conn = state.db.conn();
        entries::list(&conn, auth.id, query.entry_type, limit, offset)?
    };
    Ok(ok(entries))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<EntryDetail>>> {
    let detail = {
        let conn = state.db.conn();
        entries::detail(&conn, auth.id, id)?
    };
    Ok(ok(detail))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateEntryRequest>,
) -> Result<Json<ApiResponse<Entry>>> {
    validate_entry_fields(req.title.as_deref(), &req.content)?;

    let entry = {
        let conn = state.db.conn();
        entries::update(
            &conn,
            auth.id,
            id,
            &UpdateEntry {
                title: req.title,
                content: req.content,
                body_state_id: req.body_state_id,
                circumstance_id: req.circumstance_id,
                deadline: req.deadline,
                completed: req.completed,
            },
        )?
    };
    Ok(ok(entry))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    {
        let conn = state.db.conn();
        entries::delete(&conn, auth.id, id)?;
    }
    tracing::debug!(user_id = auth.id, entry_id = id, "entry deleted");
    Ok(ok(serde_json::json!({ "deleted": id })))
}

pub async fn set_tags(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<SetTagsRequest>,
) -> Result<Json<ApiResponse<EntryDetail>>> {
    let detail = {
        let mut conn = state.db.conn();
        entries::set_tags(&mut conn, auth.id, id, &req.tag_ids)?;
        entries::detail(&conn, auth.id, id)?
    };
    Ok(ok(detail))
}

pub async fn set_people(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<SetPeopleRequest>,
) -> Result<Json<ApiResponse<EntryDetail>>> {
    let detail = {
        let mut conn = state.db.conn();
        entries::set_people(&mut conn, auth.id, id, &req.person_ids)?;
        entries::detail(&conn, auth.id, id)?
    };
    Ok(ok(detail))
}

pub async fn set_emotions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<SetEmotionsRequest>,
) -> Result<Json<ApiResponse<EntryDetail>>> {
    for emotion in &req.emotions {
        validation::validate_intensity(emotion.intensity).map_validation_err("intensity")?;
    }
    let pairs: Vec<(i64, i64)> = req
        .emotions
        .iter()
        .map(|e| (e.emotion_id, e.intensity))
        .collect();

    let detail = {
        let mut conn = state.db.conn();
        entries::set_emotions(&mut conn, auth.id, id, &pairs)?;
        entries::detail(&conn, auth.id, id)?
    };
    Ok(ok(detail))
}
