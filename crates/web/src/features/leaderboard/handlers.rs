use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use storage::dto::leaderboard::LeaderboardResponse;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/leaderboard",
    responses(
        (status = 200, description = "Participants split into stillIn and eliminated", body = LeaderboardResponse),
        (status = 503, description = "Store unavailable")
    ),
    tag = "leaderboard"
)]
pub async fn get_leaderboard(State(state): State<AppState>) -> Result<Response, WebError> {
    let board = services::leaderboard(&state.db, &state.settings).await?;

    Ok(Json(board).into_response())
}
