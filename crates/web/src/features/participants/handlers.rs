use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::{IntoResponse, Response},
};
use storage::dto::participants::{ParticipantResponse, RegisterParticipantRequest};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/participants/{participant_id}",
    params(
        ("participant_id" = Uuid, Path, description = "Participant ID")
    ),
    responses(
        (status = 200, description = "Participant found", body = ParticipantResponse),
        (status = 404, description = "Participant not found")
    ),
    tag = "participants"
)]
pub async fn get_participant(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, WebError> {
    let Path(participant_id) = path?;

    let participant =
        services::get_participant(&state.db, &state.settings, participant_id).await?;

    Ok(Json(participant).into_response())
}

#[utoipa::path(
    put,
    path = "/api/participants/{participant_id}",
    params(
        ("participant_id" = Uuid, Path, description = "Participant ID issued by the identity provider")
    ),
    request_body = RegisterParticipantRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Participant registered or updated", body = ParticipantResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "participants"
)]
pub async fn register_participant(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RegisterParticipantRequest>, JsonRejection>,
) -> Result<Response, WebError> {
    let Path(participant_id) = path?;
    let Json(req) = payload?;
    req.validate()?;

    let participant = services::register_participant(&state.db, participant_id, &req).await?;

    Ok(Json(participant).into_response())
}
