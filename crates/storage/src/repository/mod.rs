pub mod memory;
pub mod postgres;

use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{
    Game, GameResult, NFL_TEAMS, NewGame, NewParticipant, NewPick, Participant, Pick, PickStatus,
    Team, TeamCode,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// What happened when a resolution was applied to a single pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickResolution {
    /// The pick moved from `pending` to the requested status.
    Applied(Pick),
    /// The pick already carried the requested status; nothing was written.
    Unchanged(Pick),
    /// The pick already carries a different resolved status.
    Conflict(Pick),
    /// The pick was replaced with a different team after it was read; the
    /// game no longer applies to it and nothing was written.
    Superseded(Pick),
}

/// Persistence interface the pick engine is written against.
///
/// Implementations must enforce uniqueness of picks per (participant, phase,
/// week) and per (participant, team) atomically with the write, and must
/// apply a pick resolution and the matching elimination flag as one unit.
#[async_trait::async_trait]
pub trait PickStore: Send + Sync {
    async fn find_participant(&self, participant_id: Uuid) -> Result<Option<Participant>>;

    async fn list_participants(&self) -> Result<Vec<Participant>>;

    /// Creates or renames a participant. Never touches `eliminated`.
    async fn upsert_participant(&self, participant: &NewParticipant) -> Result<Participant>;

    async fn find_team(&self, code: &TeamCode) -> Result<Option<Team>>;

    async fn list_teams(&self) -> Result<Vec<Team>>;

    async fn upsert_team(&self, team: &Team) -> Result<Team>;

    async fn find_game(&self, game_id: Uuid) -> Result<Option<Game>>;

    /// All games ordered by phase, week and kickoff.
    async fn list_games(&self) -> Result<Vec<Game>>;

    /// Inserts a game or moves its kickoff, keyed on phase, week and both
    /// teams. Fails with `ConstraintViolation` if the game already has a
    /// result.
    async fn upsert_game(&self, game: &NewGame) -> Result<Game>;

    /// Sets the result if none is recorded yet and returns the stored game,
    /// whichever result it now carries.
    async fn record_game_result(&self, game_id: Uuid, result: &GameResult) -> Result<Game>;

    /// A participant's picks ordered by phase and week.
    async fn picks_for_participant(&self, participant_id: Uuid) -> Result<Vec<Pick>>;

    async fn list_picks(&self) -> Result<Vec<Pick>>;

    /// Picks on either side of `game` in its slot.
    async fn picks_for_game(&self, game: &Game) -> Result<Vec<Pick>>;

    /// Writes a pending pick. With `replacing`, overwrites that pick only if
    /// it is still pending. Fails with `SlotTaken` or `TeamUsed` when a
    /// concurrent write got there first.
    async fn record_pick(&self, pick: &NewPick, replacing: Option<Uuid>) -> Result<Pick>;

    /// Moves a pending pick to `status`, flagging the participant eliminated
    /// when the status eliminates. Applies only while the pick still names
    /// `team`.
    async fn resolve_pick(
        &self,
        pick_id: Uuid,
        team: &TeamCode,
        status: PickStatus,
    ) -> Result<PickResolution>;
}

/// Upserts the team reference data. Returns the number of teams written.
pub async fn seed_teams(store: &dyn PickStore) -> Result<usize> {
    for (code, name) in NFL_TEAMS {
        let code = TeamCode::parse(code).map_err(StorageError::Corrupt)?;
        store
            .upsert_team(&Team {
                code,
                name: (*name).to_string(),
            })
            .await?;
    }
    Ok(NFL_TEAMS.len())
}
