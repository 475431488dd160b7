use storage::{
    Database,
    dto::participants::{ParticipantResponse, RegisterParticipantRequest},
    error::{EngineError, EngineResult},
    models::NewParticipant,
    services::{EngineSettings, retry::retry_read},
};
use uuid::Uuid;

/// Get a participant by ID
pub async fn get_participant(
    db: &Database,
    settings: &EngineSettings,
    participant_id: Uuid,
) -> EngineResult<ParticipantResponse> {
    let participant = retry_read(settings.read_retries, || async {
        db.store()
            .find_participant(participant_id)
            .await?
            .ok_or(EngineError::NotFound("Participant"))
    })
    .await?;

    Ok(ParticipantResponse::from(participant))
}

/// Register or rename a participant handed over by the identity provider
pub async fn register_participant(
    db: &Database,
    participant_id: Uuid,
    request: &RegisterParticipantRequest,
) -> EngineResult<ParticipantResponse> {
    let participant = db
        .store()
        .upsert_participant(&NewParticipant {
            participant_id,
            display_name: request.display_name.trim().to_string(),
            email: request.email.clone(),
        })
        .await?;

    tracing::info!(participant_id = %participant_id, "Participant registered");

    Ok(ParticipantResponse::from(participant))
}
