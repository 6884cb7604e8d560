pub mod problems;
pub mod topics;
pub mod upsolves;
pub mod users;

pub use problems::{PgProblemRepository, ProblemQuery, ProblemRepository, ProblemSort};
pub use topics::{PgTopicRepository, TopicRepository};
pub use upsolves::{PgUpsolveRepository, UpsolveRepository};
pub use users::{PgUserRepository, UserRepository};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database operation failed")]
    DatabaseError(#[from] sqlx::Error),
    #[error("{0} already exists")]
    Conflict(String),
}

/// Maps a unique-key violation to `Conflict`, everything else to `DatabaseError`.
pub(crate) fn classify(e: sqlx::Error, what: &str) -> StoreError {
    let unique_violation = e
        .as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false);

    if unique_violation {
        StoreError::Conflict(what.to_string())
    } else {
        StoreError::DatabaseError(e)
    }
}
