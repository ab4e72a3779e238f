//! Registration, login, session introspection and backup-code recovery.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use super::state::AppState;
use super::types::{ok, ApiResponse};
use crate::auth::{generate_backup_codes, AuthUser};
use crate::errors::{AppError, Result, ValidationErrorExt};
use crate::models::User;
use crate::repo::users;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RecoverRequest {
    pub username: String,
    pub backup_code: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub token: String,
}

/// Registration response; backup codes appear here in plaintext exactly once.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,
    pub token: String,
    pub backup_codes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BackupCodesResponse {
    pub backup_codes: Vec<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<RegisterResponse>>> {
    validation::validate_username(&req.username).map_validation_err("username")?;
    validation::validate_email(&req.email).map_validation_err("email")?;
    validation::validate_password(&req.password).map_validation_err("password")?;

    let password_hash = self::hash(&state, &req.password)?;
    let codes = generate_backup_codes(state.config.backup_code_count);
    let code_hashes = codes
        .iter()
        .map(|code| self::hash(&state, code))
        .collect::<Result<Vec<_>>>()?;

    let user = {
        let mut conn = state.db.conn();
        users::register(
            &mut conn,
            &req.username,
            &req.email,
            &password_hash,
            &code_hashes,
        )?
    };

    let token = state.token_keys.issue(user.id, &user.username)?;
    tracing::info!(user_id = user.id, username = %user.username, "user registered");

    Ok(ok(RegisterResponse {
        user,
        token,
        backup_codes: codes,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>> {
    let record = {
        let conn = state.db.conn();
        users::find_by_username(&conn, &req.username)?
    };
    // Same failure for unknown user and wrong password
    let Some(record) = record else {
        return Err(AppError::InvalidCredentials);
    };
    if !state.hasher.verify(&req.password, &record.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = state.token_keys.issue(record.id, &record.username)?;
    Ok(ok(SessionResponse {
        user: record.into_user(),
        token,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<User>>> {
    let user = {
        let conn = state.db.conn();
        users::find_by_id(&conn, auth.id)?
    };
    user.map(ok).ok_or(AppError::UserNotFound)
}

/// Replace all backup codes with a fresh set. Previously issued codes stop
/// working immediately.
pub async fn regenerate_backup_codes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<BackupCodesResponse>>> {
    let codes = generate_backup_codes(state.config.backup_code_count);
    let code_hashes = codes
        .iter()
        .map(|code| self::hash(&state, code))
        .collect::<Result<Vec<_>>>()?;

    {
        let mut conn = state.db.conn();
        users::replace_backup_codes(&mut conn, auth.id, &code_hashes)?;
    }

    tracing::info!(user_id = auth.id, "backup codes regenerated");
    Ok(ok(BackupCodesResponse {
        backup_codes: codes,
    }))
}

/// Reset a forgotten password with a one-time backup code.
pub async fn recover(
    State(state): State<AppState>,
    Json(req): Json<RecoverRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>> {
    validation::validate_password(&req.new_password).map_validation_err("new_password")?;

    let record = {
        let conn = state.db.conn();
        users::find_by_username(&conn, &req.username)?
    };
    let Some(record) = record else {
        return Err(AppError::InvalidCredentials);
    };

    let codes = {
        let conn = state.db.conn();
        users::unused_backup_codes(&conn, record.id)?
    };
    let matched = codes
        .iter()
        .find_map(|(id, hash)| match state.hasher.verify(&req.backup_code, hash) {
            Ok(true) => Some(Ok(*id)),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        })
        .transpose()?;
    let Some(code_id) = matched else {
        return Err(AppError::InvalidCredentials);
    };

    let password_hash = self::hash(&state, &req.new_password)?;
    {
        let conn = state.db.conn();
        users::mark_code_used(&conn, code_id)?;
        users::set_password(&conn, record.id, &password_hash)?;
    }

    let token = state.token_keys.issue(record.id, &record.username)?;
    tracing::info!(user_id = record.id, "password recovered via backup code");

    Ok(ok(SessionResponse {
        user: record.into_user(),
        token,
    }))
}

fn hash(state: &AppState, secret: &str) -> Result<String> {
    state.hasher.hash(secret).map_err(AppError::Internal)
}
