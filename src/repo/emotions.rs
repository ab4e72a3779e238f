//! Emotion vocabulary, unique per user. Intensities live on the entry link.

use rusqlite::{params, Connection, OptionalExtension};

use super::map_insert_err;
use crate::errors::{AppError, Result};
use crate::models::Emotion;

pub fn create(conn: &Connection, user_id: i64, name: &str) -> Result<Emotion> {
    conn.execute(
        "INSERT INTO emotions (user_id, name) VALUES (?1, ?2)",
        params![user_id, name],
    )
    .map_err(|e| map_insert_err(e, "emotion", name))?;

    Ok(Emotion {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}

pub fn get_owned(conn: &Connection, user_id: i64, id: i64) -> Result<Emotion> {
    conn.query_row(
        "SELECT id, name FROM emotions WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
        |row| {
            Ok(Emotion {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()?
    .ok_or(AppError::NotFound {
        resource: "emotion",
        id,
    })
}

pub fn list(conn: &Connection, user_id: i64) -> Result<Vec<Emotion>> {
    let mut stmt =
        conn.prepare("SELECT id, name FROM emotions WHERE user_id = ?1 ORDER BY name")?;
    let mut rows = stmt.query([user_id])?;

    let mut emotions = Vec::new();
    while let Some(row) = rows.next()? {
        emotions.push(Emotion {
            id: row.get(0)?,
            name: row.get(1)?,
        });
    }
    Ok(emotions)
}

pub fn rename(conn: &Connection, user_id: i64, id: i64, name: &str) -> Result<Emotion> {
    let changed = conn
        .execute(
            "UPDATE emotions SET name = ?3 WHERE id = ?1 AND user_id = ?2",
            params![id, user_id, name],
        )
        .map_err(|e| map_insert_err(e, "emotion", name))?;

    if changed == 0 {
        return Err(AppError::NotFound {
            resource: "emotion",
            id,
        });
    }
    Ok(Emotion {
        id,
        name: name.to_string(),
    })
}

pub fn delete(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let changed = conn.execute(
        "DELETE FROM emotions WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound {
            resource: "emotion",
            id,
        });
    }
    Ok(())
}
