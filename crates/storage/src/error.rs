use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Phase, TeamCode};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("A pick already exists for this slot")]
    SlotTaken,

    #[error("Team already used by this participant")]
    TeamUsed,

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }

    /// Failures worth retrying for idempotent reads.
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::Unavailable(_) => true,
            StorageError::Database(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::Io(_)
                    | sqlx::Error::WorkerCrashed
            ),
            _ => false,
        }
    }
}

/// Failures surfaced by the pick engine. Every variant is distinguishable by
/// the caller through [`EngineError::kind`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{team} is locked: its game kicked off at {kickoff}")]
    Locked {
        team: TeamCode,
        kickoff: DateTime<Utc>,
    },

    #[error("{0} has already been used by this participant")]
    AlreadyUsed(TeamCode),

    #[error("A pick has already been made for {phase} week {week}")]
    AlreadyPicked { phase: Phase, week: i32 },

    #[error("Game {0} has already been resolved with a different result")]
    AlreadyResolved(Uuid),

    #[error("{phase} week {week} is not open for picks")]
    InvalidWeek { phase: Phase, week: i32 },

    #[error("{0}")]
    ValidationFailed(String),

    #[error("Store unavailable")]
    StoreUnavailable(#[source] StorageError),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Locked { .. } => "locked",
            Self::AlreadyUsed(_) => "already_used",
            Self::AlreadyPicked { .. } => "already_picked",
            Self::AlreadyResolved(_) => "already_resolved",
            Self::InvalidWeek { .. } => "invalid_week",
            Self::ValidationFailed(_) => "validation_failed",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(e) if e.is_transient())
    }
}

impl From<StorageError> for EngineError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound => Self::NotFound("Record"),
            StorageError::ConstraintViolation(msg) => Self::ValidationFailed(msg),
            other => Self::StoreUnavailable(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_database_errors_count_as_unique_violations() {
        assert!(!StorageError::SlotTaken.is_unique_violation());
        assert!(!StorageError::Database(sqlx::Error::RowNotFound).is_unique_violation());
        assert!(!StorageError::Unavailable("down".to_string()).is_unique_violation());
    }

    #[test]
    fn storage_failures_map_to_engine_kinds() {
        let err = EngineError::from(StorageError::Unavailable("down".to_string()));
        assert_eq!(err.kind(), "store_unavailable");
        assert!(err.is_transient());

        let err = EngineError::from(StorageError::Database(sqlx::Error::PoolTimedOut));
        assert!(err.is_transient());

        let err = EngineError::from(StorageError::ConstraintViolation("Unknown team".into()));
        assert_eq!(err.kind(), "validation_failed");
        assert!(!err.is_transient());
    }
}
