//! Domain types shared across repositories, services and handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Dream,
    Memory,
    Thought,
    Plan,
}

impl EntryType {
    pub const ALL: [EntryType; 4] = [
        EntryType::Dream,
        EntryType::Memory,
        EntryType::Thought,
        EntryType::Plan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Dream => "dream",
            EntryType::Memory => "memory",
            EntryType::Thought => "thought",
            EntryType::Plan => "plan",
        }
    }
}

impl FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dream" => Ok(EntryType::Dream),
            "memory" => Ok(EntryType::Memory),
            "thought" => Ok(EntryType::Thought),
            "plan" => Ok(EntryType::Plan),
            other => Err(format!("unknown entry type: {other}")),
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of directed edge between two entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    LedTo,
    RemindedOf,
    InspiredBy,
    CausedBy,
    RelatedTo,
    ResultedIn,
}

impl RelationType {
    pub const ALL: [RelationType; 6] = [
        RelationType::LedTo,
        RelationType::RemindedOf,
        RelationType::InspiredBy,
        RelationType::CausedBy,
        RelationType::RelatedTo,
        RelationType::ResultedIn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::LedTo => "led_to",
            RelationType::RemindedOf => "reminded_of",
            RelationType::InspiredBy => "inspired_by",
            RelationType::CausedBy => "caused_by",
            RelationType::RelatedTo => "related_to",
            RelationType::ResultedIn => "resulted_in",
        }
    }
}

impl FromStr for RelationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "led_to" => Ok(RelationType::LedTo),
            "reminded_of" => Ok(RelationType::RemindedOf),
            "inspired_by" => Ok(RelationType::InspiredBy),
            "caused_by" => Ok(RelationType::CausedBy),
            "related_to" => Ok(RelationType::RelatedTo),
            "resulted_in" => Ok(RelationType::ResultedIn),
            other => Err(format!("unknown relation type: {other}")),
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered user (password hash never leaves the repository layer)
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A journal entry
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub id: i64,
    pub user_id: i64,
    pub entry_type: EntryType,
    pub title: Option<String>,
    pub content: String,
    pub body_state_id: Option<i64>,
    pub circumstance_id: Option<i64>,
    /// Plans only: target date
    pub deadline: Option<DateTime<Utc>>,
    /// Plans only: completion flag
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An entry plus its attachments
#[derive(Debug, Clone, Serialize)]
pub struct EntryDetail {
    #[serde(flatten)]
    pub entry: Entry,
    pub tags: Vec<Tag>,
    pub people: Vec<Person>,
    pub emotions: Vec<EntryEmotion>,
}

/// A directed, typed edge between two entries of the same user
#[derive(Debug, Clone, Serialize)]
pub struct Relation {
    pub id: i64,
    pub from_entry_id: i64,
    pub to_entry_id: i64,
    pub relation_type: RelationType,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Emotion {
    pub id: i64,
    pub name: String,
}

/// An emotion attached to an entry, with felt intensity 1-10
#[derive(Debug, Clone, Serialize)]
pub struct EntryEmotion {
    pub id: i64,
    pub name: String,
    pub intensity: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Skill {
    pub id: i64,
    pub name: String,
    pub level: i64,
    pub experience: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Circumstance {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BodyState {
    pub id: i64,
    /// Health points, 0-100
    pub health: i64,
    /// Energy points, 0-100
    pub energy: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
