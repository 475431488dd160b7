use chrono::Utc;
use storage::{
    Database,
    dto::picks::{
        AvailableTeamsResponse, PickHistoryResponse, SubmitPickRequest, SubmitPickResponse,
    },
    error::EngineResult,
    services::{
        EngineSettings,
        eligibility::{self, AvailabilityOptions},
        retry::retry_read,
        standings,
        submission::{self, SubmitPick},
    },
};
use uuid::Uuid;

/// Teams the participant may pick right now
pub async fn available_teams(
    db: &Database,
    settings: &EngineSettings,
    participant_id: Uuid,
    ignore_lock: bool,
) -> EngineResult<AvailableTeamsResponse> {
    let options = AvailabilityOptions { ignore_lock };
    retry_read(settings.read_retries, || {
        eligibility::available_teams(db.store(), participant_id, options, Utc::now())
    })
    .await
}

/// Participant's pick history
pub async fn pick_history(
    db: &Database,
    settings: &EngineSettings,
    participant_id: Uuid,
) -> EngineResult<PickHistoryResponse> {
    retry_read(settings.read_retries, || {
        standings::pick_history(db.store(), participant_id)
    })
    .await
}

/// Submit a pick. Never retried.
pub async fn submit_pick(
    db: &Database,
    settings: &EngineSettings,
    request: &SubmitPickRequest,
) -> EngineResult<SubmitPickResponse> {
    let submission = SubmitPick {
        participant_id: request.user_id,
        phase: request.phase,
        week: request.week,
        team: request.team.clone(),
        ignore_lock: request.ignore_lock,
    };
    submission::submit_pick(db.store(), settings, &submission, Utc::now()).await
}
