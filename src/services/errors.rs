use chrono::NaiveDate;
use thiserror::Error;

/// Requests the game rules refuse. Carried inside `anyhow::Error` by the
/// services and mapped to HTTP statuses by the API layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Workout for {0} is already locked in")]
    WorkoutLocked(NaiveDate),
    #[error("{0}")]
    InvalidAction(String),
    #[error("Rerolling encounters requires testing mode")]
    RerollNotAllowed,
    #[error("Encounter for {0} has already started")]
    EncounterStarted(NaiveDate),
    #[error("Inventory item {0} not found")]
    ItemNotFound(i64),
    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),
    #[error("Validation failed: {0}")]
    Validation(String),
}
