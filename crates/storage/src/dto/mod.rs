pub mod games;
pub mod leaderboard;
pub mod participants;
pub mod picks;

use crate::models::TeamCode;

/// Shared `validator` hook for raw team code fields.
pub(crate) fn validate_team_code(code: &str) -> Result<(), validator::ValidationError> {
    TeamCode::parse(code)
        .map(|_| ())
        .map_err(|_| validator::ValidationError::new("invalid_team_code"))
}
