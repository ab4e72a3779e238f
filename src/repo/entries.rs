//! Journal entries and their attachment join tables.
//!
//! Attachment replacement (`set_tags` / `set_people` / `set_emotions`)
//! swaps the full set inside one transaction; a partial failure rolls the
//! whole replacement back.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::str::FromStr;

use crate::errors::{AppError, Result};
use crate::models::{Entry, EntryDetail, EntryEmotion, EntryType, Person, Tag};

/// Fields accepted when creating an entry.
#[derive(Debug)]
pub struct NewEntry {
    pub entry_type: EntryType,
    pub title: Option<String>,
    pub content: String,
    pub body_state_id: Option<i64>,
    pub circumstance_id: Option<i64>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Fields accepted when updating an entry (full replace of mutable fields).
#[derive(Debug)]
pub struct UpdateEntry {
    pub title: Option<String>,
    pub content: String,
    pub body_state_id: Option<i64>,
    pub circumstance_id: Option<i64>,
    pub deadline: Option<DateTime<Utc>>,
    pub completed: bool,
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<Entry> {
    let type_text: String = row.get(2)?;
    let entry_type = EntryType::from_str(&type_text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, e.into())
    })?;

    Ok(Entry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        entry_type,
        title: row.get(3)?,
        content: row.get(4)?,
        body_state_id: row.get(5)?,
        circumstance_id: row.get(6)?,
        deadline: row.get(7)?,
        completed: row.get::<_, i64>(8)? != 0,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

const ENTRY_COLUMNS: &str = "id, user_id, entry_type, title, content, body_state_id,
     circumstance_id, deadline, completed, created_at, updated_at";

/// Verify an optional snapshot reference belongs to the user.
fn check_snapshot_ref(
    conn: &Connection,
    table: &'static str,
    resource: &'static str,
    id: Option<i64>,
    user_id: i64,
) -> Result<()> {
    let Some(id) = id else { return Ok(()) };

    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1 AND user_id = ?2)"),
        params![id, user_id],
        |row| row.get(0),
    )?;

    if exists == 1 {
        Ok(())
    } else {
        Err(AppError::NotFound { resource, id })
    }
}

pub fn create(conn: &Connection, user_id: i64, new: &NewEntry) -> Result<Entry> {
    check_snapshot_ref(conn, "body_states", "body state", new.body_state_id, user_id)?;
    check_snapshot_ref(
        conn,
        "circumstances",
        "circumstance",
        new.circumstance_id,
        user_id,
    )?;

    let now = Utc::now();
    conn.execute(
        "INSERT INTO entries
             (user_id, entry_type, title, content, body_state_id, circumstance_id,
              deadline, completed, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)",
        params![
            user_id,
            new.entry_type.as_str(),
            new.title,
            new.content,
            new.body_state_id,
            new.circumstance_id,
            new.deadline,
            now,
        ],
    )?;
    let id = conn.last_insert_rowid();

    get_owned(conn, user_id, id)
}

/// Fetch an entry, 404 when missing or owned by another user.
pub fn get_owned(conn: &Connection, user_id: i64, id: i64) -> Result<Entry> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1 AND user_id = ?2"
    ))?;
    let mut rows = stmt.query(params![id, user_id])?;

    match rows.next()? {
        Some(row) => Ok(row_to_entry(row)?),
        None => Err(AppError::NotFound {
            resource: "entry",
            id,
        }),
    }
}

pub fn detail(conn: &Connection, user_id: i64, id: i64) -> Result<EntryDetail> {
    let entry = get_owned(conn, user_id, id)?;
    Ok(EntryDetail {
        tags: tags_for(conn, id)?,
        people: people_for(conn, id)?,
        emotions: emotions_for(conn, id)?,
        entry,
    })
}

pub fn list(
    conn: &Connection,
    user_id: i64,
    entry_type: Option<EntryType>,
    limit: usize,
    offset: usize,
) -> Result<Vec<Entry>> {
    let mut sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE user_id = ?1");
    if entry_type.is_some() {
        sql.push_str(" AND entry_type = ?2");
    }
    sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4");

    let mut stmt = conn.prepare(&sql)?;
    let type_text = entry_type.map(|t| t.as_str());
    let mut rows = stmt.query(params![user_id, type_text, limit as i64, offset as i64])?;

    let mut entries = Vec::new();
    while let Some(row) = rows.next()? {
        entries.push(row_to_entry(row)?);
    }
    Ok(entries)
}

pub fn update(conn: &Connection, user_id: i64, id: i64, update: &UpdateEntry) -> Result<Entry> {
    check_snapshot_ref(
        conn,
        "body_states",
        "body state",
        update.body_state_id,
        user_id,
    )?;
    check_snapshot_ref(
        conn,
        "circumstances",
        "circumstance",
        update.circumstance_id,
        user_id,
    )?;

    let changed = conn.execute(
        "UPDATE entries
         SET title = ?3, content = ?4, body_state_id = ?5, circumstance_id = ?6,
             deadline = ?7, completed = ?8, updated_at = ?9
         WHERE id = ?1 AND user_id = ?2",
        params![
            id,
            user_id,
            update.title,
            update.content,
            update.body_state_id,
            update.circumstance_id,
            update.deadline,
            update.completed as i64,
            Utc::now(),
        ],
    )?;

    if changed == 0 {
        return Err(AppError::NotFound {
            resource: "entry",
            id,
        });
    }

    get_owned(conn, user_id, id)
}

/// Hard delete; join rows and relations cascade.
pub fn delete(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let changed = conn.execute(
        "DELETE FROM entries WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound {
            resource: "entry",
            id,
        });
    }
    Ok(())
}

/// Replace the full tag set of an entry in one transaction.
pub fn set_tags(conn: &mut Connection, user_id: i64, entry_id: i64, tag_ids: &[i64]) -> Result<()> {
    replace_links(
        conn,
        user_id,
        entry_id,
        tag_ids,
        "entry_tags",
        "tag_id",
        "tags",
        "tag",
    )
}

/// Replace the full people set of an entry in one transaction.
pub fn set_people(
    conn: &mut Connection,
    user_id: i64,
    entry_id: i64,
    person_ids: &[i64],
) -> Result<()> {
    replace_links(
        conn,
        user_id,
        entry_id,
        person_ids,
        "entry_people",
        "person_id",
        "people",
        "person",
    )
}

/// Replace all emotions attached to an entry (with intensities) atomically.
pub fn set_emotions(
    conn: &mut Connection,
    user_id: i64,
    entry_id: i64,
    emotions: &[(i64, i64)],
) -> Result<()> {
    let tx = conn.transaction()?;

    entry_exists_in_tx(&tx, user_id, entry_id)?;
    tx.execute("DELETE FROM entry_emotions WHERE entry_id = ?1", [entry_id])?;

    for &(emotion_id, intensity) in emotions {
        let inserted = tx.execute(
            "INSERT INTO entry_emotions (entry_id, emotion_id, intensity)
             SELECT ?1, id, ?3 FROM emotions WHERE id = ?2 AND user_id = ?4",
            params![entry_id, emotion_id, intensity, user_id],
        )?;
        if inserted == 0 {
            return Err(AppError::NotFound {
                resource: "emotion",
                id: emotion_id,
            });
        }
    }

    tx.commit()?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn replace_links(
    conn: &mut Connection,
    user_id: i64,
    entry_id: i64,
    ids: &[i64],
    join_table: &str,
    join_column: &str,
    ref_table: &str,
    resource: &'static str,
) -> Result<()> {
    let tx = conn.transaction()?;

    entry_exists_in_tx(&tx, user_id, entry_id)?;
    tx.execute(
        &format!("DELETE FROM {join_table} WHERE entry_id = ?1"),
        [entry_id],
    )?;

    for &id in ids {
        // INSERT .. SELECT both links and verifies ownership of the target
        let inserted = tx.execute(
            &format!(
                "INSERT OR IGNORE INTO {join_table} (entry_id, {join_column})
                 SELECT ?1, id FROM {ref_table} WHERE id = ?2 AND user_id = ?3"
            ),
            params![entry_id, id, user_id],
        )?;
        if inserted == 0 {
            let exists: i64 = tx.query_row(
                &format!("SELECT EXISTS(SELECT 1 FROM {ref_table} WHERE id = ?1 AND user_id = ?2)"),
                params![id, user_id],
                |row| row.get(0),
            )?;
            if exists == 0 {
                return Err(AppError::NotFound { resource, id });
            }
            // Duplicate id in the request set; already linked
        }
    }

    tx.commit()?;
    Ok(())
}

fn entry_exists_in_tx(tx: &rusqlite::Transaction<'_>, user_id: i64, entry_id: i64) -> Result<()> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM entries WHERE id = ?1 AND user_id = ?2)",
        params![entry_id, user_id],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(AppError::NotFound {
            resource: "entry",
            id: entry_id,
        });
    }
    Ok(())
}

pub fn tags_for(conn: &Connection, entry_id: i64) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name FROM entry_tags et
         INNER JOIN tags t ON t.id = et.tag_id
         WHERE et.entry_id = ?1 ORDER BY t.name",
    )?;
    let mut rows = stmt.query([entry_id])?;

    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
        });
    }
    Ok(tags)
}

pub fn people_for(conn: &Connection, entry_id: i64) -> Result<Vec<Person>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.name, p.notes FROM entry_people ep
         INNER JOIN people p ON p.id = ep.person_id
         WHERE ep.entry_id = ?1 ORDER BY p.name",
    )?;
    let mut rows = stmt.query([entry_id])?;

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

pub fn emotions_for(conn: &Connection, entry_id: i64) -> Result<Vec<EntryEmotion>> {
    let mut stmt = conn.prepare(
        "SELECT e.id, e.name, ee.intensity FROM entry_emotions ee
         INNER JOIN emotions e ON e.id = ee.emotion_id
         WHERE ee.entry_id = ?1 ORDER BY e.name",
    )?;
    let mut rows = stmt.query([entry_id])?;

    let mut emotions = Vec::new();
    while let Some(row) = rows.next()? {
        emotions.push(EntryEmotion {
            id: row.get(0)?,
            name: row.get(1)?,
            intensity: row.get(2)?,
        });
    }
    Ok(emotions)
}
