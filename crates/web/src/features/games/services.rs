use storage::{
    Database,
    dto::games::{
        CreateGameRequest, GameResponse, GamesQuery, ResolveGameRequest, ResolveGameResponse,
        TeamResponse,
    },
    error::{EngineError, EngineResult},
    models::{NewGame, TeamCode},
    services::{EngineSettings, resolution, retry::retry_read, standings},
};
use uuid::Uuid;

/// List scheduled games, optionally narrowed to one phase and week
pub async fn list_games(
    db: &Database,
    settings: &EngineSettings,
    filter: &GamesQuery,
) -> EngineResult<Vec<GameResponse>> {
    let games = retry_read(settings.read_retries, || async {
        db.store().list_games().await.map_err(EngineError::from)
    })
    .await?;

    Ok(games
        .into_iter()
        .filter(|g| filter.phase.is_none_or(|phase| g.phase == phase))
        .filter(|g| filter.week.is_none_or(|week| g.week == week))
        .map(GameResponse::from)
        .collect())
}

/// List team reference data
pub async fn list_teams(
    db: &Database,
    settings: &EngineSettings,
) -> EngineResult<Vec<TeamResponse>> {
    let teams = retry_read(settings.read_retries, || async {
        db.store().list_teams().await.map_err(EngineError::from)
    })
    .await?;

    Ok(teams.into_iter().map(TeamResponse::from).collect())
}

/// Insert or reschedule a game from the schedule feed
pub async fn upsert_game(db: &Database, request: &CreateGameRequest) -> EngineResult<GameResponse> {
    let home_team = TeamCode::parse(&request.home_team).map_err(EngineError::ValidationFailed)?;
    let away_team = TeamCode::parse(&request.away_team).map_err(EngineError::ValidationFailed)?;
    if home_team == away_team {
        return Err(EngineError::ValidationFailed(
            "home_team and away_team must differ".to_string(),
        ));
    }

    let game = db
        .store()
        .upsert_game(&NewGame {
            phase: request.phase,
            week: request.week,
            home_team,
            away_team,
            start_time: request.start_time,
        })
        .await?;

    tracing::info!(
        game_id = %game.game_id,
        phase = %game.phase,
        week = game.week,
        "Game scheduled"
    );

    Ok(GameResponse::from(game))
}

/// Apply a final result and return the refreshed standings
pub async fn resolve_game(
    db: &Database,
    settings: &EngineSettings,
    game_id: Uuid,
    request: &ResolveGameRequest,
) -> EngineResult<ResolveGameResponse> {
    let resolved =
        resolution::resolve_game(db.store(), game_id, &request.team, request.outcome).await?;

    let standings =
        retry_read(settings.read_retries, || standings::summary(db.store())).await?;

    Ok(ResolveGameResponse {
        game: GameResponse::from(resolved.game),
        updated_picks: resolved.updated_picks.into_iter().map(Into::into).collect(),
        standings,
    })
}
