//! People mentioned across a user's entries.

use rusqlite::{params, Connection, OptionalExtension};

use super::map_insert_err;
use crate::errors::{AppError, Result};
use crate::models::Person;

pub fn create(conn: &Connection, user_id: i64, name: &str, notes: Option<&str>) -> Result<Person> {
    conn.execute(
        "INSERT INTO people (user_id, name, notes) VALUES (?1, ?2, ?3)",
        params![user_id, name, notes],
    )
    .map_err(|e| map_insert_err(e, "person", name))?;

    Ok(Person {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        notes: notes.map(|s| s.to_string()),
    })
}

pub fn get_owned(conn: &Connection, user_id: i64, id: i64) -> Result<Person> {
    conn.query_row(
        "SELECT id, name, notes FROM people WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
        |row| {
            Ok(Person {
                id: row.get(0)?,
                name: row.get(1)?,
                notes: row.get(2)?,
            })
        },
    )
    .optional()?
    .ok_or(AppError::NotFound {
        resource: "person",
        id,
    })
}

pub fn list(conn: &Connection, user_id: i64) -> Result<Vec<Person>> {
    let mut stmt =
        conn.prepare("SELECT id, name, notes FROM people WHERE user_id = ?1 ORDER BY name")?;
    let mut rows = stmt.query([user_id])?;

    let mut people = Vec::new();
    while let Some(row) = rows.next()? {
        people.push(Person {
            id: row.get(0)?,
            name: row.get(1)?,
            notes: row.get(2)?,
        });
    }
    Ok(people)
}

pub fn update(
    conn: &Connection,
    user_id: i64,
    id: i64,
    name: &str,
    notes: Option<&str>,
) -> Result<Person> {
    let changed = conn
        .execute(
            "UPDATE people SET name = ?3, notes = ?4 WHERE id = ?1 AND user_id = ?2",
            params![id, user_id, name, notes],
        )
        .map_err(|e| map_insert_err(e, "person", name))?;

    if changed == 0 {
        return Err(AppError::NotFound {
            resource: "person",
            id,
        });
    }
    Ok(Person {
        id,
        name: name.to_string(),
        notes: notes.map(|s| s.to_string()),
    })
}

pub fn delete(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let changed = conn.execute(
        "DELETE FROM people WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound {
            resource: "person",
            id,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::repo::users;

    #[test]
    fn test_crud() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn();
        let user = users::create(&conn, "alice", "a@example.com", "h").unwrap();

        let person = create(&conn, user.id, "Maya", Some("sister")).unwrap();
        assert_eq!(person.notes.as_deref(), Some("sister"));

        let updated = update(&conn, user.id, person.id, "Maya R", None).unwrap();
        assert_eq!(updated.name, "Maya R");
        assert!(updated.notes.is_none());

        assert_eq!(list(&conn, user.id).unwrap().len(), 1);
        delete(&conn, user.id, person.id).unwrap();
        assert!(get_owned(&conn, user.id, person.id).is_err());
    }
}
