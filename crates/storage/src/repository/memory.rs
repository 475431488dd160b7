use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{
    Game, GameResult, NewGame, NewParticipant, NewPick, Participant, Pick, PickStatus, Team,
    TeamCode,
};

use super::{PickResolution, PickStore};

#[derive(Default)]
struct State {
    participants: HashMap<Uuid, Participant>,
    teams: HashMap<TeamCode, Team>,
    games: HashMap<Uuid, Game>,
    picks: HashMap<Uuid, Pick>,
}

/// Process-local store. Every write takes the single state lock, which makes
/// each validate-then-write sequence atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    failing_reads: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` read calls fail with a transient error.
    pub fn fail_next_reads(&self, count: u32) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<()> {
        let injected = self
            .failing_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match injected {
            Ok(_) => Err(StorageError::Unavailable(
                "injected read failure".to_string(),
            )),
            Err(_) => Ok(()),
        }
    }
}

fn sort_picks(picks: &mut [Pick]) {
    picks.sort_by(|a, b| a.slot().cmp(&b.slot()).then(a.submitted_at.cmp(&b.submitted_at)));
}

#[async_trait::async_trait]
impl PickStore for MemoryStore {
    async fn find_participant(&self, participant_id: Uuid) -> Result<Option<Participant>> {
        self.check_read()?;
        let state = self.state.read().await;
        Ok(state.participants.get(&participant_id).cloned())
    }

    async fn list_participants(&self) -> Result<Vec<Participant>> {
        self.check_read()?;
        let state = self.state.read().await;
        let mut participants: Vec<Participant> = state.participants.values().cloned().collect();
        participants.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then(a.participant_id.cmp(&b.participant_id))
        });
        Ok(participants)
    }

    async fn upsert_participant(&self, participant: &NewParticipant) -> Result<Participant> {
        let mut state = self.state.write().await;
        let entry = state
            .participants
            .entry(participant.participant_id)
            .or_insert_with(|| Participant {
                participant_id: participant.participant_id,
                display_name: participant.display_name.clone(),
                email: participant.email.clone(),
                eliminated: false,
                created_at: Utc::now(),
            });
        entry.display_name = participant.display_name.clone();
        entry.email = participant.email.clone();
        Ok(entry.clone())
    }

    async fn find_team(&self, code: &TeamCode) -> Result<Option<Team>> {
        self.check_read()?;
        let state = self.state.read().await;
        Ok(state.teams.get(code).cloned())
    }

    async fn list_teams(&self) -> Result<Vec<Team>> {
        self.check_read()?;
        let state = self.state.read().await;
        let mut teams: Vec<Team> = state.teams.values().cloned().collect();
        teams.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(teams)
    }

    async fn upsert_team(&self, team: &Team) -> Result<Team> {
        let mut state = self.state.write().await;
        state.teams.insert(team.code.clone(), team.clone());
        Ok(team.clone())
    }

    async fn find_game(&self, game_id: Uuid) -> Result<Option<Game>> {
        self.check_read()?;
        let state = self.state.read().await;
        Ok(state.games.get(&game_id).cloned())
    }

    async fn list_games(&self) -> Result<Vec<Game>> {
        self.check_read()?;
        let state = self.state.read().await;
        let mut games: Vec<Game> = state.games.values().cloned().collect();
        games.sort_by(|a, b| {
            a.slot()
                .cmp(&b.slot())
                .then(a.start_time.cmp(&b.start_time))
                .then(a.home_team.cmp(&b.home_team))
        });
        Ok(games)
    }

    async fn upsert_game(&self, game: &NewGame) -> Result<Game> {
        let mut state = self.state.write().await;
        for team in [&game.home_team, &game.away_team] {
            if !state.teams.contains_key(team) {
                return Err(StorageError::ConstraintViolation(format!(
                    "Unknown team {}",
                    team
                )));
            }
        }

        let existing = state.games.values_mut().find(|g| {
            g.phase == game.phase
                && g.week == game.week
                && g.home_team == game.home_team
                && g.away_team == game.away_team
        });

        if let Some(existing) = existing {
            if existing.result.is_some() && existing.start_time != game.start_time {
                return Err(StorageError::ConstraintViolation(
                    "Cannot reschedule a game that already has a result".to_string(),
                ));
            }
            existing.start_time = game.start_time;
            return Ok(existing.clone());
        }

        let created = Game {
            game_id: Uuid::new_v4(),
            phase: game.phase,
            week: game.week,
            home_team: game.home_team.clone(),
            away_team: game.away_team.clone(),
            start_time: game.start_time,
            result: None,
        };
        state.games.insert(created.game_id, created.clone());
        Ok(created)
    }

    async fn record_game_result(&self, game_id: Uuid, result: &GameResult) -> Result<Game> {
        let mut state = self.state.write().await;
        let game = state.games.get_mut(&game_id).ok_or(StorageError::NotFound)?;
        if game.result.is_none() {
            game.result = Some(result.clone());
        }
        Ok(game.clone())
    }

    async fn picks_for_participant(&self, participant_id: Uuid) -> Result<Vec<Pick>> {
        self.check_read()?;
        let state = self.state.read().await;
        let mut picks: Vec<Pick> = state
            .picks
            .values()
            .filter(|p| p.participant_id == participant_id)
            .cloned()
            .collect();
        sort_picks(&mut picks);
        Ok(picks)
    }

    async fn list_picks(&self) -> Result<Vec<Pick>> {
        self.check_read()?;
        let state = self.state.read().await;
        let mut picks: Vec<Pick> = state.picks.values().cloned().collect();
        sort_picks(&mut picks);
        Ok(picks)
    }

    async fn picks_for_game(&self, game: &Game) -> Result<Vec<Pick>> {
        self.check_read()?;
        let state = self.state.read().await;
        let mut picks: Vec<Pick> = state
            .picks
            .values()
            .filter(|p| p.slot() == game.slot() && game.involves(&p.team_code))
            .cloned()
            .collect();
        sort_picks(&mut picks);
        Ok(picks)
    }

    async fn record_pick(&self, pick: &NewPick, replacing: Option<Uuid>) -> Result<Pick> {
        let mut state = self.state.write().await;

        let slot_holder = state
            .picks
            .values()
            .find(|p| {
                p.participant_id == pick.participant_id
                    && p.phase == pick.phase
                    && p.week == pick.week
            })
            .map(|p| (p.pick_id, p.status));

        match (slot_holder, replacing) {
            (None, None) => {}
            (Some((holder, PickStatus::Pending)), Some(replaced)) if holder == replaced => {}
            _ => return Err(StorageError::SlotTaken),
        }

        let team_taken = state.picks.values().any(|p| {
            p.participant_id == pick.participant_id
                && p.team_code == pick.team_code
                && Some(p.pick_id) != replacing
        });
        if team_taken {
            return Err(StorageError::TeamUsed);
        }

        let stored = Pick {
            pick_id: replacing.unwrap_or_else(Uuid::new_v4),
            participant_id: pick.participant_id,
            phase: pick.phase,
            week: pick.week,
            team_code: pick.team_code.clone(),
            status: PickStatus::Pending,
            submitted_at: pick.submitted_at,
        };
        state.picks.insert(stored.pick_id, stored.clone());
        Ok(stored)
    }

    async fn resolve_pick(
        &self,
        pick_id: Uuid,
        team: &TeamCode,
        status: PickStatus,
    ) -> Result<PickResolution> {
        let mut guard = self.state.write().await;
        let State {
            picks,
            participants,
            ..
        } = &mut *guard;
        let pick = picks.get_mut(&pick_id).ok_or(StorageError::NotFound)?;

        if pick.team_code != *team {
            return Ok(PickResolution::Superseded(pick.clone()));
        }
        if pick.status == status {
            return Ok(PickResolution::Unchanged(pick.clone()));
        }
        if pick.status.is_resolved() {
            return Ok(PickResolution::Conflict(pick.clone()));
        }

        let participant = participants
            .get_mut(&pick.participant_id)
            .ok_or(StorageError::NotFound)?;

        pick.status = status;
        if status.eliminates() {
            participant.eliminated = true;
        }

        Ok(PickResolution::Applied(pick.clone()))
    }
}
