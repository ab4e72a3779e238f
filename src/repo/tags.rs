//! User-scoped tag vocabulary. Names are unique per user.

use rusqlite::{params, Connection, OptionalExtension};

use super::map_insert_err;
use crate::errors::{AppError, Result};
use crate::models::Tag;

pub fn create(conn: &Connection, user_id: i64, name: &str) -> Result<Tag> {
    conn.execute(
        "INSERT INTO tags (user_id, name) VALUES (?1, ?2)",
        params![user_id, name],
    )
    .map_err(|e| map_insert_err(e, "tag", name))?;

    Ok(Tag {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}

pub fn get_owned(conn: &Connection, user_id: i64, id: i64) -> Result<Tag> {
    conn.query_row(
        "SELECT id, name FROM tags WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
        |row| {
            Ok(Tag {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()?
    .ok_or(AppError::NotFound {
        resource: "tag",
        id,
    })
}

pub fn list(conn: &Connection, user_id: i64) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare("SELECT id, name FROM tags WHERE user_id = ?1 ORDER BY name")?;
    let mut rows = stmt.query([user_id])?;

    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
        });
    }
    Ok(tags)
}

pub fn rename(conn: &Connection, user_id: i64, id: i64, name: &str) -> Result<Tag> {
    let changed = conn
        .execute(
            "UPDATE tags SET name = ?3 WHERE id = ?1 AND user_id = ?2",
            params![id, user_id, name],
        )
        .map_err(|e| map_insert_err(e, "tag", name))?;

    if changed == 0 {
        return Err(AppError::NotFound {
            resource: "tag",
            id,
        });
    }
    Ok(Tag {
        id,
        name: name.to_string(),
    })
}

/// Delete a tag; join rows in `entry_tags` cascade away.
pub fn delete(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let changed = conn.execute(
        "DELETE FROM tags WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound {
            resource: "tag",
            id,
        });
    }
    Ok(())
}
