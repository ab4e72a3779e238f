//! Input validation for the API boundary.
//!
//! Validators return `anyhow::Result` and are mapped to field-tagged 400s
//! via `errors::ValidationErrorExt` at the handler layer.

use anyhow::{anyhow, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Maximum lengths and ranges
pub const MAX_CONTENT_LENGTH: usize = 50_000; // 50KB
pub const MAX_TITLE_LENGTH: usize = 256;
pub const MAX_NAME_LENGTH: usize = 64;
pub const MAX_DESCRIPTION_LENGTH: usize = 1_000;
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 32;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const MAX_CHAIN_DEPTH: usize = 25;
pub const DEFAULT_CHAIN_DEPTH: usize = 3;
pub const MAX_LIST_LIMIT: usize = 100;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

/// Validate username: 3-32 chars, alphanumeric plus dash/underscore
pub fn validate_username(username: &str) -> Result<()> {
    if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        return Err(anyhow!(
            "username must be {MIN_USERNAME_LENGTH}-{MAX_USERNAME_LENGTH} characters, got {}",
            username.len()
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(anyhow!(
            "username contains invalid characters (allowed: alphanumeric, -, _)"
        ));
    }

    Ok(())
}

/// Validate email shape
pub fn validate_email(email: &str) -> Result<()> {
    if email.len() > 254 || !email_regex().is_match(email) {
        return Err(anyhow!("not a valid email address"));
    }
    Ok(())
}

/// Validate password length (content is unrestricted)
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(anyhow!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(anyhow!(
            "password too long: {} chars (max: {MAX_PASSWORD_LENGTH})",
            password.len()
        ));
    }
    Ok(())
}

/// Validate entry content
pub fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(anyhow!("content cannot be empty"));
    }

    if content.len() > MAX_CONTENT_LENGTH {
        return Err(anyhow!(
            "content too long: {} chars (max: {MAX_CONTENT_LENGTH})",
            content.len()
        ));
    }

    Ok(())
}

/// Validate entry title (optional field; empty not allowed when present)
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(anyhow!("title cannot be empty"));
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(anyhow!(
            "title too long: {} chars (max: {MAX_TITLE_LENGTH})",
            title.len()
        ));
    }
    Ok(())
}

/// Validate a reference-entity name (person, tag, emotion, skill, ...)
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(anyhow!("name cannot be empty"));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(anyhow!(
            "name too long: {} chars (max: {MAX_NAME_LENGTH})",
            name.len()
        ));
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(anyhow!("name contains invalid control characters"));
    }

    Ok(())
}

/// Validate a free-text description
pub fn validate_description(description: &str) -> Result<()> {
    if description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(anyhow!(
            "description too long: {} chars (max: {MAX_DESCRIPTION_LENGTH})",
            description.len()
        ));
    }
    Ok(())
}

/// Validate emotion intensity (1-10)
pub fn validate_intensity(intensity: i64) -> Result<()> {
    if !(1..=10).contains(&intensity) {
        return Err(anyhow!(
            "intensity must be between 1 and 10, got: {intensity}"
        ));
    }
    Ok(())
}

/// Validate body-state points (health, energy: 0-100)
pub fn validate_points(points: i64) -> Result<()> {
    if !(0..=100).contains(&points) {
        return Err(anyhow!("points must be between 0 and 100, got: {points}"));
    }
    Ok(())
}

/// Validate experience gained in one progress event
pub fn validate_experience(experience: i64) -> Result<()> {
    if experience <= 0 {
        return Err(anyhow!("experience must be positive, got: {experience}"));
    }
    if experience > 10_000 {
        return Err(anyhow!(
            "experience too large: {experience} (max: 10,000 per event)"
        ));
    }
    Ok(())
}

/// Validate and clamp a chain traversal depth
pub fn validate_depth(depth: usize) -> Result<usize> {
    if depth == 0 {
        return Err(anyhow!("depth must be greater than 0"));
    }
    if depth > MAX_CHAIN_DEPTH {
        return Err(anyhow!("depth too large: {depth} (max: {MAX_CHAIN_DEPTH})"));
    }
    Ok(depth)
}

/// Validate a list limit
pub fn validate_limit(limit: usize) -> Result<usize> {
    if limit == 0 {
        return Err(anyhow!("limit must be greater than 0"));
    }
    if limit > MAX_LIST_LIMIT {
        return Err(anyhow!("limit too large: {limit} (max: {MAX_LIST_LIMIT})"));
    }
    Ok(limit)
}
