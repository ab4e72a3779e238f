//! Body state snapshots (health and energy at the moment of an entry).

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::errors::{AppError, Result};
use crate::models::BodyState;

fn row_to_body_state(row: &Row<'_>) -> rusqlite::Result<BodyState> {
    Ok(BodyState {
        id: row.get(0)?,
        health: row.get(1)?,
        energy: row.get(2)?,
        note: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub fn create(
    conn: &Connection,
    user_id: i64,
    health: i64,
    energy: i64,
    note: Option<&str>,
) -> Result<BodyState> {
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO body_states (user_id, health, energy, note, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user_id, health, energy, note, created_at],
    )?;

    Ok(BodyState {
        id: conn.last_insert_rowid(),
        health,
        energy,
        note: note.map(|s| s.to_string()),
        created_at,
    })
}

pub fn get_owned(conn: &Connection, user_id: i64, id: i64) -> Result<BodyState> {
    conn.query_row(
        "SELECT id, health, energy, note, created_at
         FROM body_states WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
        row_to_body_state,
    )
    .optional()?
    .ok_or(AppError::NotFound {
        resource: "body state",
        id,
    })
}

pub fn list(conn: &Connection, user_id: i64) -> Result<Vec<BodyState>> {
    let mut stmt = conn.prepare(
        "SELECT id, health, energy, note, created_at
         FROM body_states WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
    )?;
    let mut rows = stmt.query([user_id])?;

    let mut states = Vec::new();
    while let Some(row) = rows.next()? {
        states.push(row_to_body_state(row)?);
    }
    Ok(states)
}

pub fn update(
    conn: &Connection,
    user_id: i64,
    id: i64,
    health: i64,
    energy: i64,
    note: Option<&str>,
) -> Result<BodyState> {
    let changed = conn.execute(
        "UPDATE body_states SET health = ?3, energy = ?4, note = ?5
         WHERE id = ?1 AND user_id = ?2",
        params![id, user_id, health, energy, note],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound {
            resource: "body state",
            id,
        });
    }
    get_owned(conn, user_id, id)
}

pub fn delete(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let changed = conn.execute(
        "DELETE FROM body_states WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound {
            resource: "body state",
            id,
        });
    }
    Ok(())
}
