use storage::{
    Database,
    dto::leaderboard::LeaderboardResponse,
    error::EngineResult,
    services::{EngineSettings, retry::retry_read, standings},
};

/// Still-in and eliminated participants with their pick histories
pub async fn leaderboard(
    db: &Database,
    settings: &EngineSettings,
) -> EngineResult<LeaderboardResponse> {
    retry_read(settings.read_retries, || standings::leaderboard(db.store())).await
}
