//! lucid-journal - a personal journaling server.
//!
//! Entries of type dream/memory/thought/plan, linked by a directed, typed
//! relation graph, with per-user reference entities (people, tags, emotions,
//! skills, circumstances, body states) and aggregate analytics.
//!
//! The crate is split into:
//! - `db` / `repo`: SQLite storage and parameterized-SQL repositories
//! - `graph`: cycle detection and chain walking over the relation graph
//! - `auth`: JWT issuance, peppered password hashing, backup codes
//! - `handlers`: the axum REST surface under `/api/v1`

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod graph;
pub mod handlers;
pub mod models;
pub mod repo;
pub mod stats;
pub mod validation;
