//! User accounts and backup codes.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::map_insert_err;
use crate::errors::Result;
use crate::models::User;

/// Internal read model carrying the password hash; never serialized.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

/// Create a user together with their initial backup codes, atomically.
///
/// If any code insert fails the user row is rolled back too, so a retry
/// with the same username cannot hit a duplicate-name conflict.
pub fn register(
    conn: &mut Connection,
    username: &str,
    email: &str,
    password_hash: &str,
    code_hashes: &[String],
) -> Result<User> {
    let created_at = Utc::now();
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO users (username, email, password_hash, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![username, email, password_hash, created_at],
    )
    .map_err(|e| map_insert_err(e, "user", username))?;
    let id = tx.last_insert_rowid();

    for hash in code_hashes {
        tx.execute(
            "INSERT INTO backup_codes (user_id, code_hash, used, created_at)
             VALUES (?1, ?2, 0, ?3)",
            params![id, hash, created_at],
        )?;
    }

    tx.commit()?;
    Ok(User {
        id,
        username: username.to_string(),
        email: email.to_string(),
        created_at,
    })
}

pub fn create(conn: &Connection, username: &str, email: &str, password_hash: &str) -> Result<User> {
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO users (username, email, password_hash, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![username, email, password_hash, created_at],
    )
    .map_err(|e| map_insert_err(e, "user", username))?;

    Ok(User {
        id: conn.last_insert_rowid(),
        username: username.to_string(),
        email: email.to_string(),
        created_at,
    })
}

pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<UserRecord>> {
    let record = conn
        .query_row(
            "SELECT id, username, email, password_hash, created_at
             FROM users WHERE username = ?1",
            [username],
            |row| {
                Ok(UserRecord {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                    password_hash: row.get(3)?,
                    created_at: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(record)
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, username, email, created_at FROM users WHERE id = ?1",
            [id],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

pub fn set_password(conn: &Connection, user_id: i64, password_hash: &str) -> Result<()> {
    conn.execute(
        "UPDATE users SET password_hash = ?2 WHERE id = ?1",
        params![user_id, password_hash],
    )?;
    Ok(())
}

/// Replace all backup codes for a user with a fresh set, atomically.
pub fn replace_backup_codes(conn: &mut Connection, user_id: i64, code_hashes: &[String]) -> Result<()> {
    let created_at = Utc::now();
    let tx = conn.transaction()?;

    tx.execute("DELETE FROM backup_codes WHERE user_id = ?1", [user_id])?;
    for hash in code_hashes {
        tx.execute(
            "INSERT INTO backup_codes (user_id, code_hash, used, created_at)
             VALUES (?1, ?2, 0, ?3)",
            params![user_id, hash, created_at],
        )?;
    }

    tx.commit()?;
    Ok(())
}

/// All unused backup codes for a user as `(id, code_hash)` pairs.
pub fn unused_backup_codes(conn: &Connection, user_id: i64) -> Result<Vec<(i64, String)>> {
    let mut stmt = conn.prepare(
        "SELECT id, code_hash FROM backup_codes
         WHERE user_id = ?1 AND used = 0
         ORDER BY id",
    )?;
    let mut rows = stmt.query([user_id])?;

    let mut codes = Vec::new();
    while let Some(row) = rows.next()? {
        codes.push((row.get(0)?, row.get(1)?));
    }
    Ok(codes)
}

/// Burn a backup code after a successful recovery.
pub fn mark_code_used(conn: &Connection, code_id: i64) -> Result<()> {
    conn.execute("UPDATE backup_codes SET used = 1 WHERE id = ?1", [code_id])?;
    Ok(())
}
