use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::games::{
    CreateGameRequest, GameResponse, GamesQuery, ResolveGameRequest, ResolveGameResponse,
    TeamResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/games",
    params(GamesQuery),
    responses(
        (status = 200, description = "Scheduled games ordered by phase, week and kickoff", body = Vec<GameResponse>)
    ),
    tag = "games"
)]
pub async fn list_games(
    State(state): State<AppState>,
    query: Result<Query<GamesQuery>, QueryRejection>,
) -> Result<Response, WebError> {
    let Query(filter) = query?;

    let games = services::list_games(&state.db, &state.settings, &filter).await?;

    Ok(Json(games).into_response())
}

#[utoipa::path(
    get,
    path = "/api/teams",
    responses(
        (status = 200, description = "Team reference data", body = Vec<TeamResponse>)
    ),
    tag = "games"
)]
pub async fn list_teams(State(state): State<AppState>) -> Result<Response, WebError> {
    let teams = services::list_teams(&state.db, &state.settings).await?;

    Ok(Json(teams).into_response())
}

#[utoipa::path(
    post,
    path = "/api/games",
    request_body = CreateGameRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Game scheduled or rescheduled", body = GameResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "games"
)]
pub async fn create_game(
    State(state): State<AppState>,
    payload: Result<Json<CreateGameRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    let game = services::upsert_game(&state.db, &req).await?;

    Ok((StatusCode::CREATED, Json(game)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/games/{game_id}/result",
    params(
        ("game_id" = Uuid, Path, description = "Game ID")
    ),
    request_body = ResolveGameRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Result applied; lists the picks this call changed", body = ResolveGameResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Game not found"),
        (status = 409, description = "Game already resolved with a different result")
    ),
    tag = "games"
)]
pub async fn resolve_game(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ResolveGameRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Path(game_id) = path?;
    let Json(req) = payload?;
    req.validate()?;

    let resolved = services::resolve_game(&state.db, &state.settings, game_id, &req).await?;

    Ok(Json(resolved).into_response())
}
