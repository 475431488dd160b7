use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::leaderboard::StandingsSummary;
use super::picks::PickResponse;
use super::validate_team_code;
use crate::models::{Game, Outcome, Phase, Team, TeamCode};

/// Schedule row pushed by the score feed
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateGameRequest {
    pub phase: Phase,

    #[validate(range(min = 1, message = "Week must be at least 1"))]
    pub week: i32,

    #[validate(custom(function = "validate_team_code"))]
    pub home_team: String,

    #[validate(custom(function = "validate_team_code"))]
    pub away_team: String,

    pub start_time: DateTime<Utc>,
}

/// Final result for a game; `team` nominates the side `outcome` refers to
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ResolveGameRequest {
    #[validate(custom(function = "validate_team_code"))]
    pub team: String,

    pub outcome: Outcome,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GamesQuery {
    pub phase: Option<Phase>,
    pub week: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GameResultInfo {
    #[schema(value_type = String)]
    pub team: TeamCode,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GameResponse {
    pub id: Uuid,
    pub phase: Phase,
    pub week: i32,
    #[schema(value_type = String)]
    pub home_team: TeamCode,
    #[schema(value_type = String)]
    pub away_team: TeamCode,
    pub start_time: DateTime<Utc>,
    pub result: Option<GameResultInfo>,
}

impl From<Game> for GameResponse {
    fn from(game: Game) -> Self {
        Self {
            id: game.game_id,
            phase: game.phase,
            week: game.week,
            home_team: game.home_team,
            away_team: game.away_team,
            start_time: game.start_time,
            result: game.result.map(|r| GameResultInfo {
                team: r.team,
                outcome: r.outcome,
            }),
        }
    }
}

/// Resolved game, the picks this call changed, and the refreshed standings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResolveGameResponse {
    pub game: GameResponse,
    pub updated_picks: Vec<PickResponse>,
    pub standings: StandingsSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamResponse {
    #[schema(value_type = String)]
    pub code: TeamCode,
    pub name: String,
}

impl From<Team> for TeamResponse {
    fn from(team: Team) -> Self {
        Self {
            code: team.code,
            name: team.name,
        }
    }
}
