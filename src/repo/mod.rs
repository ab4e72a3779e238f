//! Parameterized-SQL repositories, one per table group.
//!
//! Every query is scoped by `user_id` so cross-user rows are simply not
//! found (the uniform 404 policy). Multi-statement writes run inside an
//! explicit transaction taken from the shared connection.

pub mod body_states;
pub mod circumstances;
pub mod emotions;
pub mod entries;
pub mod people;
pub mod relations;
pub mod skills;
pub mod tags;
pub mod users;

use crate::errors::AppError;

/// Map a UNIQUE-constraint violation to a 409, anything else to a 500.
pub(crate) fn map_insert_err(err: rusqlite::Error, resource: &'static str, name: &str) -> AppError {
    if let rusqlite::Error::SqliteFailure(e, Some(msg)) = &err {
        if e.code == rusqlite::ErrorCode::ConstraintViolation && msg.contains("UNIQUE") {
            return AppError::DuplicateName {
                resource,
                name: name.to_string(),
            };
        }
    }
    err.into()
}
