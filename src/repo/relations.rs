//! Directed entry-to-entry relations.
//!
//! Both endpoints of a relation must belong to the same user; ownership is
//! enforced at insert time and every read joins through the owning entry,
//! so foreign rows fall out as not found.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::str::FromStr;

use crate::errors::{AppError, Result};
use crate::graph::Edge;
use crate::models::{Relation, RelationType};

/// Incoming and outgoing relations of a single entry.
#[derive(Debug, Serialize)]
pub struct EntryRelations {
    pub incoming: Vec<Relation>,
    pub outgoing: Vec<Relation>,
}

fn row_to_relation(row: &Row<'_>) -> rusqlite::Result<Relation> {
    let type_text: String = row.get(3)?;
    let relation_type = RelationType::from_str(&type_text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
    })?;

    Ok(Relation {
        id: row.get(0)?,
        from_entry_id: row.get(1)?,
        to_entry_id: row.get(2)?,
        relation_type,
        description: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const RELATION_COLUMNS: &str =
    "r.id, r.from_entry_id, r.to_entry_id, r.relation_type, r.description, r.created_at";

pub fn create(
    conn: &Connection,
    user_id: i64,
    from_entry_id: i64,
    to_entry_id: i64,
    relation_type: RelationType,
    description: Option<&str>,
) -> Result<Relation> {
    // Both endpoints must exist and be owned by the caller.
    for entry_id in [from_entry_id, to_entry_id] {
        let exists: i64 = conn.query_row(
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
    }

    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO entry_relations
             (from_entry_id, to_entry_id, relation_type, description, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            from_entry_id,
            to_entry_id,
            relation_type.as_str(),
            description,
            created_at,
        ],
    )?;

    Ok(Relation {
        id: conn.last_insert_rowid(),
        from_entry_id,
        to_entry_id,
        relation_type,
        description: description.map(|s| s.to_string()),
        created_at,
    })
}

pub fn get_owned(conn: &Connection, user_id: i64, id: i64) -> Result<Relation> {
    let relation = conn
        .query_row(
            &format!(
                "SELECT {RELATION_COLUMNS} FROM entry_relations r
                 INNER JOIN entries e ON e.id = r.from_entry_id
                 WHERE r.id = ?1 AND e.user_id = ?2"
            ),
            params![id, user_id],
            row_to_relation,
        )
        .optional()?;

    relation.ok_or(AppError::NotFound {
        resource: "relation",
        id,
    })
}

pub fn delete(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let changed = conn.execute(
        "DELETE FROM entry_relations
         WHERE id = ?1
           AND from_entry_id IN (SELECT id FROM entries WHERE user_id = ?2)",
        params![id, user_id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound {
            resource: "relation",
            id,
        });
    }
    Ok(())
}

/// All relations touching one entry, split by direction.
pub fn for_entry(conn: &Connection, user_id: i64, entry_id: i64) -> Result<EntryRelations> {
    let exists: i64 = conn.query_row(
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

    let mut outgoing = Vec::new();
    let mut stmt = conn.prepare(&format!(
        "SELECT {RELATION_COLUMNS} FROM entry_relations r
         WHERE r.from_entry_id = ?1 ORDER BY r.id"
    ))?;
    let mut rows = stmt.query([entry_id])?;
    while let Some(row) = rows.next()? {
        outgoing.push(row_to_relation(row)?);
    }

    let mut incoming = Vec::new();
    let mut stmt = conn.prepare(&format!(
        "SELECT {RELATION_COLUMNS} FROM entry_relations r
         WHERE r.to_entry_id = ?1 ORDER BY r.id"
    ))?;
    let mut rows = stmt.query([entry_id])?;
    while let Some(row) = rows.next()? {
        incoming.push(row_to_relation(row)?);
    }

    Ok(EntryRelations { incoming, outgoing })
}

/// All of a user's relations with their metadata.
pub fn list_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Relation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RELATION_COLUMNS} FROM entry_relations r
         INNER JOIN entries e ON e.id = r.from_entry_id
         WHERE e.user_id = ?1
         ORDER BY r.id"
    ))?;
    let mut rows = stmt.query([user_id])?;

    let mut all = Vec::new();
    while let Some(row) = rows.next()? {
        all.push(row_to_relation(row)?);
    }
    Ok(all)
}

/// The user's full relation graph as an edge list for traversal.
pub fn edges_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Edge>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.from_entry_id, r.to_entry_id, r.relation_type
         FROM entry_relations r
         INNER JOIN entries e ON e.id = r.from_entry_id
         WHERE e.user_id = ?1
         ORDER BY r.id",
    )?;
    let mut rows = stmt.query([user_id])?;

    let mut edges = Vec::new();
    while let Some(row) = rows.next()? {
        let type_text: String = row.get(3)?;
        let relation_type = RelationType::from_str(&type_text).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
        })?;
        edges.push(Edge {
            id: row.get(0)?,
            from: row.get(1)?,
            to: row.get(2)?,
            relation_type,
        });
    }
    Ok(edges)
}
