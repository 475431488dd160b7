use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::dto::picks::{PickResponse, SubmitPickResponse};
use crate::error::{EngineError, EngineResult, StorageError};
use crate::models::{Game, NewPick, Phase, PickStatus, Slot, TeamCode};
use crate::repository::PickStore;

use super::EngineSettings;
use super::eligibility::{AvailabilityOptions, compute_available};

/// A participant's request to fill one slot.
#[derive(Debug, Clone)]
pub struct SubmitPick {
    pub participant_id: Uuid,
    pub phase: Phase,
    pub week: i32,
    pub team: String,
    pub ignore_lock: bool,
}

/// Validates and records a pick, failing fast in this order: participant,
/// team, slot and lock, season-wide reuse, existing pick in the slot.
pub async fn submit_pick(
    store: &dyn PickStore,
    settings: &EngineSettings,
    request: &SubmitPick,
    now: DateTime<Utc>,
) -> EngineResult<SubmitPickResponse> {
    let participant = store
        .find_participant(request.participant_id)
        .await?
        .ok_or(EngineError::NotFound("Participant"))?;

    let team = TeamCode::parse(&request.team).map_err(EngineError::ValidationFailed)?;
    store
        .find_team(&team)
        .await?
        .ok_or(EngineError::NotFound("Team"))?;

    let slot = Slot::new(request.phase, request.week);
    let invalid_week = || EngineError::InvalidWeek {
        phase: slot.phase,
        week: slot.week,
    };
    if slot.week < 1 {
        return Err(invalid_week());
    }

    let games = store.list_games().await?;
    let slot_games: Vec<&Game> = games.iter().filter(|g| g.slot() == slot).collect();
    if slot_games.is_empty() {
        return Err(invalid_week());
    }

    let game = slot_games
        .iter()
        .find(|g| g.involves(&team))
        .ok_or(EngineError::NotFound("Game"))?;

    let ignore_lock = request.ignore_lock && settings.allow_lock_override;
    if game.result.is_some() || (!ignore_lock && game.is_locked(now)) {
        return Err(EngineError::Locked {
            team,
            kickoff: game.start_time,
        });
    }

    let mut picks = store.picks_for_participant(participant.participant_id).await?;

    if picks.iter().any(|p| p.team_code == team && p.slot() != slot) {
        return Err(EngineError::AlreadyUsed(team));
    }

    let already_picked = || EngineError::AlreadyPicked {
        phase: slot.phase,
        week: slot.week,
    };
    let replacing = match picks.iter().find(|p| p.slot() == slot) {
        None => None,
        Some(existing) if settings.allow_pending_override => {
            if existing.status != PickStatus::Pending {
                return Err(already_picked());
            }
            let existing_locked = slot_games
                .iter()
                .find(|g| g.involves(&existing.team_code))
                .is_some_and(|g| g.is_locked(now));
            if existing_locked && !ignore_lock {
                return Err(already_picked());
            }
            Some(existing.pick_id)
        }
        Some(_) => return Err(already_picked()),
    };

    let new_pick = NewPick {
        participant_id: participant.participant_id,
        phase: slot.phase,
        week: slot.week,
        team_code: team.clone(),
        submitted_at: now,
    };

    let stored = store
        .record_pick(&new_pick, replacing)
        .await
        .map_err(|e| match e {
            StorageError::SlotTaken => already_picked(),
            StorageError::TeamUsed => EngineError::AlreadyUsed(team.clone()),
            other => EngineError::from(other),
        })?;

    tracing::info!(
        participant_id = %stored.participant_id,
        phase = %stored.phase,
        week = stored.week,
        team = %stored.team_code,
        replaced = replacing.is_some(),
        "Pick accepted"
    );

    picks.retain(|p| p.slot() != slot);
    picks.push(stored.clone());
    let available = compute_available(
        &games,
        &picks,
        AvailabilityOptions { ignore_lock },
        now,
    );

    Ok(SubmitPickResponse {
        pick: PickResponse::from(stored),
        available,
    })
}
