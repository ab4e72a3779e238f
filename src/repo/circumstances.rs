//! Circumstance snapshots: where and under what conditions an entry happened.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::errors::{AppError, Result};
use crate::models::Circumstance;

fn row_to_circumstance(row: &Row<'_>) -> rusqlite::Result<Circumstance> {
    Ok(Circumstance {
        id: row.get(0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub fn create(
    conn: &Connection,
    user_id: i64,
    name: &str,
    location: Option<&str>,
    description: Option<&str>,
) -> Result<Circumstance> {
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO circumstances (user_id, name, location, description, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user_id, name, location, description, created_at],
    )?;

    Ok(Circumstance {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        location: location.map(|s| s.to_string()),
        description: description.map(|s| s.to_string()),
        created_at,
    })
}

pub fn get_owned(conn: &Connection, user_id: i64, id: i64) -> Result<Circumstance> {
    conn.query_row(
        "SELECT id, name, location, description, created_at
         FROM circumstances WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
        row_to_circumstance,
    )
    .optional()?
    .ok_or(AppError::NotFound {
        resource: "circumstance",
        id,
    })
}

pub fn list(conn: &Connection, user_id: i64) -> Result<Vec<Circumstance>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, location, description, created_at
         FROM circumstances WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
    )?;
    let mut rows = stmt.query([user_id])?;

    let mut circumstances = Vec::new();
    while let Some(row) = rows.next()? {
        circumstances.push(row_to_circumstance(row)?);
    }
    Ok(circumstances)
}

pub fn update(
    conn: &Connection,
    user_id: i64,
    id: i64,
    name: &str,
    location: Option<&str>,
    description: Option<&str>,
) -> Result<Circumstance> {
    let changed = conn.execute(
        "UPDATE circumstances SET name = ?3, location = ?4, description = ?5
         WHERE id = ?1 AND user_id = ?2",
        params![id, user_id, name, location, description],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound {
            resource: "circumstance",
            id,
        });
    }
    get_owned(conn, user_id, id)
}

/// Delete a snapshot; entries pointing at it keep existing with a NULL link.
pub fn delete(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let changed = conn.execute(
        "DELETE FROM circumstances WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound {
            resource: "circumstance",
            id,
        });
    }
    Ok(())
}
