//! Skills with an experience ledger.
//!
//! Each progress event appends to `skill_progress` and folds its experience
//! into the skill row; the level is recomputed from total experience inside
//! the same transaction. Leveling up from level n costs 100 * n experience,
//! so the cumulative threshold for level L is 50 * L * (L - 1).

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::map_insert_err;
use crate::errors::{AppError, Result};
use crate::models::Skill;

/// Level reached with `experience` total points.
pub fn level_for_experience(experience: i64) -> i64 {
    let mut level = 1;
    while 50 * (level + 1) * level <= experience {
        level += 1;
    }
    level
}

pub fn create(conn: &Connection, user_id: i64, name: &str) -> Result<Skill> {
    conn.execute(
        "INSERT INTO skills (user_id, name, level, experience) VALUES (?1, ?2, 1, 0)",
        params![user_id, name],
    )
    .map_err(|e| map_insert_err(e, "skill", name))?;

    Ok(Skill {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        level: 1,
        experience: 0,
    })
}

pub fn get_owned(conn: &Connection, user_id: i64, id: i64) -> Result<Skill> {
    conn.query_row(
        "SELECT id, name, level, experience FROM skills WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
        |row| {
            Ok(Skill {
                id: row.get(0)?,
                name: row.get(1)?,
                level: row.get(2)?,
                experience: row.get(3)?,
            })
        },
    )
    .optional()?
    .ok_or(AppError::NotFound {
        resource: "skill",
        id,
    })
}

pub fn list(conn: &Connection, user_id: i64) -> Result<Vec<Skill>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, level, experience FROM skills WHERE user_id = ?1 ORDER BY name",
    )?;
    let mut rows = stmt.query([user_id])?;

    let mut skills = Vec::new();
    while let Some(row) = rows.next()? {
        skills.push(Skill {
            id: row.get(0)?,
            name: row.get(1)?,
            level: row.get(2)?,
            experience: row.get(3)?,
        });
    }
    Ok(skills)
}

pub fn rename(conn: &Connection, user_id: i64, id: i64, name: &str) -> Result<Skill> {
    let changed = conn
        .execute(
            "UPDATE skills SET name = ?3 WHERE id = ?1 AND user_id = ?2",
            params![id, user_id, name],
        )
        .map_err(|e| map_insert_err(e, "skill", name))?;

    if changed == 0 {
        return Err(AppError::NotFound {
            resource: "skill",
            id,
        });
    }
    get_owned(conn, user_id, id)
}

pub fn delete(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let changed = conn.execute(
        "DELETE FROM skills WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound {
            resource: "skill",
            id,
        });
    }
    Ok(())
}

/// Record a progress event and return the updated skill.
///
/// The optional `entry_id` links the gain back to the journal entry that
/// earned it; it must be owned by the same user.
pub fn add_progress(
    conn: &mut Connection,
    user_id: i64,
    skill_id: i64,
    experience: i64,
    entry_id: Option<i64>,
) -> Result<Skill> {
    let tx = conn.transaction()?;

    let current: Option<i64> = tx
        .query_row(
            "SELECT experience FROM skills WHERE id = ?1 AND user_id = ?2",
            params![skill_id, user_id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(current) = current else {
        return Err(AppError::NotFound {
            resource: "skill",
            id: skill_id,
        });
    };

    if let Some(entry_id) = entry_id {
        let owned: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM entries WHERE id = ?1 AND user_id = ?2)",
            params![entry_id, user_id],
            |row| row.get(0),
        )?;
        if owned == 0 {
            return Err(AppError::NotFound {
                resource: "entry",
                id: entry_id,
            });
        }
    }

    tx.execute(
        "INSERT INTO skill_progress (skill_id, entry_id, experience, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![skill_id, entry_id, experience, Utc::now()],
    )?;

    let total = current + experience;
    tx.execute(
        "UPDATE skills SET experience = ?2, level = ?3 WHERE id = ?1",
        params![skill_id, total, level_for_experience(total)],
    )?;

    tx.commit()?;
    get_owned(conn, user_id, skill_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::repo::users;

    #[test]
    fn test_level_thresholds() {
        assert_eq!(level_for_experience(0), 1);
        assert_eq!(level_for_experience(99), 1);
        // Level 2 costs 100
        assert_eq!(level_for_experience(100), 2);
        // Level 3 costs another 200 (300 total)
        assert_eq!(level_for_experience(299), 2);
        assert_eq!(level_for_experience(300), 3);
        // Level 4 at 600 total
        assert_eq!(level_for_experience(600), 4);
    }

    #[test]
    fn test_progress_accumulates_and_levels_up() {
        let db = Database::open_in_memory().unwrap();
        let mut conn = db.conn();
        let user = users::create(&conn, "alice", "a@example.com", "h").unwrap();

        let skill = create(&conn, user.id, "lucid dreaming").unwrap();
        assert_eq!(skill.level, 1);

        let after = add_progress(&mut conn, user.id, skill.id, 60, None).unwrap();
        assert_eq!(after.experience, 60);
        assert_eq!(after.level, 1);

        let after = add_progress(&mut conn, user.id, skill.id, 60, None).unwrap();
        assert_eq!(after.experience, 120);
        assert_eq!(after.level, 2);
    }

    #[test]
    fn test_progress_rejects_foreign_skill() {
        let db = Database::open_in_memory().unwrap();
        let mut conn = db.conn();
        let alice = users::create(&conn, "alice", "a@example.com", "h").unwrap();
        let bob = users::create(&conn, "bob", "b@example.com", "h").unwrap();

        let skill = create(&conn, alice.id, "meditation").unwrap();
        let err = add_progress(&mut conn, bob.id, skill.id, 10, None).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }
}
