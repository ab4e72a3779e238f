//! Journaling statistics: overview counts, day streaks and a yearly heatmap.

use chrono::{Duration, NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

use crate::errors::Result;
use crate::models::EntryType;

/// Totals across a user's journal.
#[derive(Debug, Serialize)]
pub struct Overview {
    pub entries: EntryCounts,
    pub people: i64,
    pub tags: i64,
    pub emotions: i64,
    pub skills: i64,
    pub relations: i64,
}

#[derive(Debug, Serialize)]
pub struct EntryCounts {
    pub total: i64,
    pub dreams: i64,
    pub memories: i64,
    pub thoughts: i64,
    pub plans: i64,
}

/// Consecutive-day journaling streaks.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Streak {
    /// Days ending today (or yesterday, if today has no entry yet)
    pub current: i64,
    pub longest: i64,
}

/// One day of journaling activity.
#[derive(Debug, Serialize)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub count: i64,
}

pub fn overview(conn: &Connection, user_id: i64) -> Result<Overview> {
    let mut by_type: HashMap<String, i64> = HashMap::new();
    let mut stmt = conn.prepare(
        "SELECT entry_type, COUNT(*) FROM entries WHERE user_id = ?1 GROUP BY entry_type",
    )?;
    let mut rows = stmt.query([user_id])?;
    while let Some(row) = rows.next()? {
        by_type.insert(row.get(0)?, row.get(1)?);
    }
    let count_of = |ty: EntryType| by_type.get(ty.as_str()).copied().unwrap_or(0);

    let scalar = |sql: &str| -> Result<i64> {
        Ok(conn.query_row(sql, [user_id], |row| row.get(0))?)
    };

    Ok(Overview {
        entries: EntryCounts {
            total: by_type.values().sum(),
            dreams: count_of(EntryType::Dream),
            memories: count_of(EntryType::Memory),
            thoughts: count_of(EntryType::Thought),
            plans: count_of(EntryType::Plan),
        },
        people: scalar("SELECT COUNT(*) FROM people WHERE user_id = ?1")?,
        tags: scalar("SELECT COUNT(*) FROM tags WHERE user_id = ?1")?,
        emotions: scalar("SELECT COUNT(*) FROM emotions WHERE user_id = ?1")?,
        skills: scalar("SELECT COUNT(*) FROM skills WHERE user_id = ?1")?,
        relations: scalar(
            "SELECT COUNT(*) FROM entry_relations r
             INNER JOIN entries e ON e.id = r.from_entry_id
             WHERE e.user_id = ?1",
        )?,
    })
}

pub fn streak(conn: &Connection, user_id: i64) -> Result<Streak> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT date(created_at) FROM entries
         WHERE user_id = ?1 ORDER BY date(created_at)",
    )?;
    let mut rows = stmt.query([user_id])?;

    let mut days: Vec<NaiveDate> = Vec::new();
    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        if let Ok(date) = text.parse() {
            days.push(date);
        }
    }

    Ok(streak_from_days(&days, Utc::now().date_naive()))
}

/// Compute streaks from a sorted list of distinct journaling days.
///
/// The current streak survives a missing entry today; it breaks once the
/// most recent day is before yesterday.
fn streak_from_days(days: &[NaiveDate], today: NaiveDate) -> Streak {
    let mut longest = 0i64;
    let mut run = 0i64;
    let mut prev: Option<NaiveDate> = None;

    for &day in days {
        run = match prev {
            Some(p) if day - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }

    let current = match prev {
        Some(last) if today - last <= Duration::days(1) => run,
        _ => 0,
    };

    Streak { current, longest }
}

/// Per-day entry counts, either for one calendar year or for the trailing
/// year ending today. Days without entries are omitted.
pub fn heatmap(conn: &Connection, user_id: i64, year: Option<i32>) -> Result<Vec<HeatmapDay>> {
    let (since, until) = match year {
        Some(year) => (format!("{year}-01-01"), format!("{year}-12-31")),
        None => {
            let today = Utc::now().date_naive();
            ((today - Duration::days(365)).to_string(), today.to_string())
        }
    };

    let mut stmt = conn.prepare(
        "SELECT date(created_at) AS day, COUNT(*) FROM entries
         WHERE user_id = ?1 AND date(created_at) BETWEEN ?2 AND ?3
         GROUP BY day ORDER BY day",
    )?;
    let mut rows = stmt.query(rusqlite::params![user_id, since, until])?;

    let mut cells = Vec::new();
    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        if let Ok(date) = text.parse() {
            cells.push(HeatmapDay {
                date,
                count: row.get(1)?,
            });
        }
    }
    Ok(cells)
}
