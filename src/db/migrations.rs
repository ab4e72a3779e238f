//! Schema migration registry and executor.
//!
//! Migrations are registered in strictly increasing order and applied
//! atomically; the applied version is mirrored to `PRAGMA user_version`.
//!
//! Ownership lives on every row via `user_id`; cross-entry links cascade on
//! entry deletion. `entry_relations` deliberately carries NO uniqueness
//! constraint on (from, to, type) and no acyclicity guarantee - duplicate
//! edges are permitted and cycle prevention is advisory at the service
//! layer.

use anyhow::{bail, Result};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: "
    CREATE TABLE users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        username      TEXT NOT NULL UNIQUE,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    TEXT NOT NULL
    );

    CREATE TABLE backup_codes (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        code_hash  TEXT NOT NULL,
        used       INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );
    CREATE INDEX idx_backup_codes_user ON backup_codes(user_id);

    CREATE TABLE body_states (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        health     INTEGER NOT NULL CHECK (health BETWEEN 0 AND 100),
        energy     INTEGER NOT NULL CHECK (energy BETWEEN 0 AND 100),
        note       TEXT,
        created_at TEXT NOT NULL
    );
    CREATE INDEX idx_body_states_user ON body_states(user_id);

    CREATE TABLE circumstances (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name        TEXT NOT NULL,
        location    TEXT,
        description TEXT,
        created_at  TEXT NOT NULL
    );
    CREATE INDEX idx_circumstances_user ON circumstances(user_id);

    CREATE TABLE entries (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id         INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        entry_type      TEXT NOT NULL CHECK (entry_type IN ('dream', 'memory', 'thought', 'plan')),
        title           TEXT,
        content         TEXT NOT NULL,
        body_state_id   INTEGER REFERENCES body_states(id) ON DELETE SET NULL,
        circumstance_id INTEGER REFERENCES circumstances(id) ON DELETE SET NULL,
        deadline        TEXT,
        completed       INTEGER NOT NULL DEFAULT 0,
        created_at      TEXT NOT NULL,
        updated_at      TEXT NOT NULL
    );
    CREATE INDEX idx_entries_user ON entries(user_id);
    CREATE INDEX idx_entries_user_type ON entries(user_id, entry_type);

    CREATE TABLE people (
        id      INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name    TEXT NOT NULL,
        notes   TEXT,
        UNIQUE (user_id, name)
    );

    CREATE TABLE tags (
        id      INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name    TEXT NOT NULL,
        UNIQUE (user_id, name)
    );

    CREATE TABLE emotions (
        id      INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name    TEXT NOT NULL,
        UNIQUE (user_id, name)
    );

    CREATE TABLE skills (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name       TEXT NOT NULL,
        level      INTEGER NOT NULL DEFAULT 1,
        experience INTEGER NOT NULL DEFAULT 0,
        UNIQUE (user_id, name)
    );

    CREATE TABLE entry_people (
        entry_id  INTEGER NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
        person_id INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
        PRIMARY KEY (entry_id, person_id)
    );

    CREATE TABLE entry_tags (
        entry_id INTEGER NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
        tag_id   INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        PRIMARY KEY (entry_id, tag_id)
    );

    CREATE TABLE entry_emotions (
        entry_id   INTEGER NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
        emotion_id INTEGER NOT NULL REFERENCES emotions(id) ON DELETE CASCADE,
        intensity  INTEGER NOT NULL CHECK (intensity BETWEEN 1 AND 10),
        PRIMARY KEY (entry_id, emotion_id)
    );

    CREATE TABLE skill_progress (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        skill_id   INTEGER NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
        entry_id   INTEGER REFERENCES entries(id) ON DELETE SET NULL,
        experience INTEGER NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX idx_skill_progress_skill ON skill_progress(skill_id);

    CREATE TABLE entry_relations (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        from_entry_id INTEGER NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
        to_entry_id   INTEGER NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
        relation_type TEXT NOT NULL CHECK (relation_type IN
            ('led_to', 'reminded_of', 'inspired_by', 'caused_by', 'related_to', 'resulted_in')),
        description   TEXT,
        created_at    TEXT NOT NULL
    );
    CREATE INDEX idx_relations_from ON entry_relations(from_entry_id);
    CREATE INDEX idx_relations_to ON entry_relations(to_entry_id);
    ",
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    let current_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();

    if current_version > latest {
        bail!(
            "database schema version {current_version} is newer than this binary supports ({latest})"
        );
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(())
}
