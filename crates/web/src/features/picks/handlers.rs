use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::picks::{
    AvailableTeamsQuery, AvailableTeamsResponse, PickHistoryResponse, SubmitPickRequest,
    SubmitPickResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/picks/available/{participant_id}",
    params(
        ("participant_id" = Uuid, Path, description = "Participant ID"),
        AvailableTeamsQuery
    ),
    responses(
        (status = 200, description = "Current slot and the teams still available in it", body = AvailableTeamsResponse),
        (status = 404, description = "Participant not found")
    ),
    tag = "picks"
)]
pub async fn get_available_teams(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<AvailableTeamsQuery>, QueryRejection>,
) -> Result<Response, WebError> {
    let Path(participant_id) = path?;
    let Query(query) = query?;

    let available =
        services::available_teams(&state.db, &state.settings, participant_id, query.ignore_lock)
            .await?;

    Ok(Json(available).into_response())
}

#[utoipa::path(
    get,
    path = "/api/picks/history/{participant_id}",
    params(
        ("participant_id" = Uuid, Path, description = "Participant ID")
    ),
    responses(
        (status = 200, description = "Picks ordered by phase and week", body = PickHistoryResponse),
        (status = 404, description = "Participant not found")
    ),
    tag = "picks"
)]
pub async fn get_pick_history(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, WebError> {
    let Path(participant_id) = path?;

    let history = services::pick_history(&state.db, &state.settings, participant_id).await?;

    Ok(Json(history).into_response())
}

#[utoipa::path(
    post,
    path = "/api/picks/submit",
    request_body = SubmitPickRequest,
    responses(
        (status = 201, description = "Pick recorded; includes refreshed availability", body = SubmitPickResponse),
        (status = 400, description = "Malformed input or week not open"),
        (status = 404, description = "Participant, team or game not found"),
        (status = 409, description = "Locked, team already used, or slot already picked"),
        (status = 503, description = "Store unavailable; re-submit")
    ),
    tag = "picks"
)]
pub async fn submit_pick(
    State(state): State<AppState>,
    payload: Result<Json<SubmitPickRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(req) = payload?;
    req.validate()?;

    let response = services::submit_pick(&state.db, &state.settings, &req).await?;

    Ok((StatusCode::CREATED, Json(response)).into_response())
}
