use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::dto::picks::AvailableTeamsResponse;
use crate::error::{EngineError, EngineResult};
use crate::models::{Game, Phase, Pick, Slot, TeamCode};
use crate::repository::PickStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct AvailabilityOptions {
    /// Skip the kickoff filter. Never skips the season-wide reuse filter.
    pub ignore_lock: bool,
}

/// Teams `participant_id` may pick in their current slot. Pure read.
pub async fn available_teams(
    store: &dyn PickStore,
    participant_id: Uuid,
    options: AvailabilityOptions,
    now: DateTime<Utc>,
) -> EngineResult<AvailableTeamsResponse> {
    store
        .find_participant(participant_id)
        .await?
        .ok_or(EngineError::NotFound("Participant"))?;

    let games = store.list_games().await?;
    let picks = store.picks_for_participant(participant_id).await?;

    Ok(compute_available(&games, &picks, options, now))
}

/// Picks the current slot and filters its teams.
///
/// The current slot is the earliest one the participant has not picked that
/// still has an unlocked game. When no slot qualifies, the earliest slot with
/// an unlocked game is reported (or the last scheduled slot once everything
/// has kicked off) with no teams.
pub fn compute_available(
    games: &[Game],
    picks: &[Pick],
    options: AvailabilityOptions,
    now: DateTime<Utc>,
) -> AvailableTeamsResponse {
    let is_open =
        |game: &Game| game.result.is_none() && (options.ignore_lock || !game.is_locked(now));

    let picked: HashSet<Slot> = picks.iter().map(Pick::slot).collect();
    let used: HashSet<&TeamCode> = picks.iter().map(|p| &p.team_code).collect();
    let open_slots: BTreeSet<Slot> = games.iter().filter(|g| is_open(*g)).map(Game::slot).collect();

    let current = open_slots.iter().find(|slot| !picked.contains(*slot)).copied();

    let Some(slot) = current else {
        let fallback = open_slots
            .first()
            .copied()
            .or_else(|| games.iter().map(Game::slot).max())
            .unwrap_or(Slot::new(Phase::Reg, 1));

        return AvailableTeamsResponse {
            week: fallback.week,
            phase: fallback.phase,
            available_teams: Vec::new(),
        };
    };

    let mut available_teams: Vec<TeamCode> = games
        .iter()
        .filter(|g| g.slot() == slot && is_open(*g))
        .flat_map(|g| [&g.home_team, &g.away_team])
        .filter(|team| !used.contains(team))
        .cloned()
        .collect();
    available_teams.sort();
    available_teams.dedup();

    AvailableTeamsResponse {
        week: slot.week,
        phase: slot.phase,
        available_teams,
    }
}
