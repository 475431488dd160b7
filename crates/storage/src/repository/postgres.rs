use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{
    Game, GameResult, NewGame, NewParticipant, NewPick, Participant, Pick, PickStatus, Team,
    TeamCode,
};

use super::{PickResolution, PickStore};

const SLOT_CONSTRAINT: &str = "picks_slot_key";
const TEAM_CONSTRAINT: &str = "picks_team_key";

const GAME_COLUMNS: &str =
    "game_id, phase, week, home_team, away_team, start_time, result_team, result_outcome";
const PICK_COLUMNS: &str = "pick_id, participant_id, phase, week, team_code, status, submitted_at";

#[derive(FromRow)]
struct ParticipantRow {
    participant_id: Uuid,
    display_name: String,
    email: Option<String>,
    eliminated: bool,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct TeamRow {
    code: String,
    name: String,
}

#[derive(FromRow)]
struct GameRow {
    game_id: Uuid,
    phase: String,
    week: i32,
    home_team: String,
    away_team: String,
    start_time: DateTime<Utc>,
    result_team: Option<String>,
    result_outcome: Option<String>,
}

#[derive(FromRow)]
struct PickRow {
    pick_id: Uuid,
    participant_id: Uuid,
    phase: String,
    week: i32,
    team_code: String,
    status: String,
    submitted_at: DateTime<Utc>,
}

impl From<ParticipantRow> for Participant {
    fn from(row: ParticipantRow) -> Self {
        Self {
            participant_id: row.participant_id,
            display_name: row.display_name,
            email: row.email,
            eliminated: row.eliminated,
            created_at: row.created_at,
        }
    }
}

impl TryFrom<TeamRow> for Team {
    type Error = StorageError;

    fn try_from(row: TeamRow) -> Result<Self> {
        Ok(Self {
            code: TeamCode::parse(&row.code).map_err(StorageError::Corrupt)?,
            name: row.name,
        })
    }
}

impl TryFrom<GameRow> for Game {
    type Error = StorageError;

    fn try_from(row: GameRow) -> Result<Self> {
        let result = match (row.result_team, row.result_outcome) {
            (Some(team), Some(outcome)) => Some(GameResult {
                team: TeamCode::parse(&team).map_err(StorageError::Corrupt)?,
                outcome: outcome.parse().map_err(StorageError::Corrupt)?,
            }),
            (None, None) => None,
            _ => {
                return Err(StorageError::Corrupt(format!(
                    "game {} has a partial result",
                    row.game_id
                )));
            }
        };

        Ok(Self {
            game_id: row.game_id,
            phase: row.phase.parse().map_err(StorageError::Corrupt)?,
            week: row.week,
            home_team: TeamCode::parse(&row.home_team).map_err(StorageError::Corrupt)?,
            away_team: TeamCode::parse(&row.away_team).map_err(StorageError::Corrupt)?,
            start_time: row.start_time,
            result,
        })
    }
}

impl TryFrom<PickRow> for Pick {
    type Error = StorageError;

    fn try_from(row: PickRow) -> Result<Self> {
        Ok(Self {
            pick_id: row.pick_id,
            participant_id: row.participant_id,
            phase: row.phase.parse().map_err(StorageError::Corrupt)?,
            week: row.week,
            team_code: TeamCode::parse(&row.team_code).map_err(StorageError::Corrupt)?,
            status: row.status.parse().map_err(StorageError::Corrupt)?,
            submitted_at: row.submitted_at,
        })
    }
}

fn decode_all<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = StorageError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Maps unique violations on the picks table to the slot/team errors.
fn map_pick_write_error(error: sqlx::Error) -> StorageError {
    let error = StorageError::from(error);
    if !error.is_unique_violation() {
        return error;
    }
    let mapped = match &error {
        StorageError::Database(sqlx::Error::Database(db_err)) => match db_err.constraint() {
            Some(SLOT_CONSTRAINT) => Some(StorageError::SlotTaken),
            Some(TEAM_CONSTRAINT) => Some(StorageError::TeamUsed),
            _ => None,
        },
        _ => None,
    };
    mapped.unwrap_or(error)
}

/// PostgreSQL-backed store. Uniqueness of picks is enforced by the
/// `picks_slot_key` and `picks_team_key` constraints.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn fetch_pick(&self, pick_id: Uuid) -> Result<Pick> {
        let row: PickRow = sqlx::query_as(&format!(
            "SELECT {} FROM picks WHERE pick_id = $1",
            PICK_COLUMNS
        ))
        .bind(pick_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Pick::try_from(row)
    }
}

#[async_trait::async_trait]
impl PickStore for PgStore {
    async fn find_participant(&self, participant_id: Uuid) -> Result<Option<Participant>> {
        let row: Option<ParticipantRow> = sqlx::query_as(
            r#"
            SELECT participant_id, display_name, email, eliminated, created_at
            FROM participants
            WHERE participant_id = $1
            "#,
        )
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Participant::from))
    }

    async fn list_participants(&self) -> Result<Vec<Participant>> {
        let rows: Vec<ParticipantRow> = sqlx::query_as(
            r#"
            SELECT participant_id, display_name, email, eliminated, created_at
            FROM participants
            ORDER BY display_name, participant_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Participant::from).collect())
    }

    async fn upsert_participant(&self, participant: &NewParticipant) -> Result<Participant> {
        let row: ParticipantRow = sqlx::query_as(
            r#"
            INSERT INTO participants (participant_id, display_name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (participant_id)
            DO UPDATE SET
                display_name = EXCLUDED.display_name,
                email = EXCLUDED.email
            RETURNING participant_id, display_name, email, eliminated, created_at
            "#,
        )
        .bind(participant.participant_id)
        .bind(&participant.display_name)
        .bind(&participant.email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_team(&self, code: &TeamCode) -> Result<Option<Team>> {
        let row: Option<TeamRow> = sqlx::query_as("SELECT code, name FROM teams WHERE code = $1")
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Team::try_from).transpose()
    }

    async fn list_teams(&self) -> Result<Vec<Team>> {
        let rows: Vec<TeamRow> = sqlx::query_as("SELECT code, name FROM teams ORDER BY code")
            .fetch_all(&self.pool)
            .await?;

        decode_all(rows)
    }

    async fn upsert_team(&self, team: &Team) -> Result<Team> {
        let row: TeamRow = sqlx::query_as(
            r#"
            INSERT INTO teams (code, name)
            VALUES ($1, $2)
            ON CONFLICT (code) DO UPDATE SET name = EXCLUDED.name
            RETURNING code, name
            "#,
        )
        .bind(team.code.as_str())
        .bind(&team.name)
        .fetch_one(&self.pool)
        .await?;

        Team::try_from(row)
    }

    async fn find_game(&self, game_id: Uuid) -> Result<Option<Game>> {
        let row: Option<GameRow> = sqlx::query_as(&format!(
            "SELECT {} FROM games WHERE game_id = $1",
            GAME_COLUMNS
        ))
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Game::try_from).transpose()
    }

    async fn list_games(&self) -> Result<Vec<Game>> {
        let rows: Vec<GameRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM games
            ORDER BY CASE phase WHEN 'pre' THEN 0 WHEN 'reg' THEN 1 ELSE 2 END,
                     week, start_time, home_team
            "#,
            GAME_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    async fn upsert_game(&self, game: &NewGame) -> Result<Game> {
        let row: Option<GameRow> = sqlx::query_as(&format!(
            r#"
            INSERT INTO games (game_id, phase, week, home_team, away_team, start_time)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (phase, week, home_team, away_team)
            DO UPDATE SET start_time = EXCLUDED.start_time
            WHERE games.result_team IS NULL OR games.start_time = EXCLUDED.start_time
            RETURNING {}
            "#,
            GAME_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(game.phase.as_str())
        .bind(game.week)
        .bind(game.home_team.as_str())
        .bind(game.away_team.as_str())
        .bind(game.start_time)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            let error = StorageError::from(e);
            if error.is_foreign_key_violation() {
                return StorageError::ConstraintViolation("Unknown team".to_string());
            }
            error
        })?;

        let row = row.ok_or_else(|| {
            StorageError::ConstraintViolation(
                "Cannot reschedule a game that already has a result".to_string(),
            )
        })?;

        Game::try_from(row)
    }

    async fn record_game_result(&self, game_id: Uuid, result: &GameResult) -> Result<Game> {
        let updated: Option<GameRow> = sqlx::query_as(&format!(
            r#"
            UPDATE games
            SET result_team = $2, result_outcome = $3
            WHERE game_id = $1 AND result_team IS NULL
            RETURNING {}
            "#,
            GAME_COLUMNS
        ))
        .bind(game_id)
        .bind(result.team.as_str())
        .bind(result.outcome.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(row) => Game::try_from(row),
            None => self.find_game(game_id).await?.ok_or(StorageError::NotFound),
        }
    }

    async fn picks_for_participant(&self, participant_id: Uuid) -> Result<Vec<Pick>> {
        let rows: Vec<PickRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM picks
            WHERE participant_id = $1
            ORDER BY CASE phase WHEN 'pre' THEN 0 WHEN 'reg' THEN 1 ELSE 2 END, week
            "#,
            PICK_COLUMNS
        ))
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    async fn list_picks(&self) -> Result<Vec<Pick>> {
        let rows: Vec<PickRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM picks
            ORDER BY CASE phase WHEN 'pre' THEN 0 WHEN 'reg' THEN 1 ELSE 2 END,
                     week, submitted_at
            "#,
            PICK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    async fn picks_for_game(&self, game: &Game) -> Result<Vec<Pick>> {
        let rows: Vec<PickRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM picks
            WHERE phase = $1 AND week = $2 AND team_code IN ($3, $4)
            ORDER BY submitted_at
            "#,
            PICK_COLUMNS
        ))
        .bind(game.phase.as_str())
        .bind(game.week)
        .bind(game.home_team.as_str())
        .bind(game.away_team.as_str())
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    async fn record_pick(&self, pick: &NewPick, replacing: Option<Uuid>) -> Result<Pick> {
        let row: Option<PickRow> = match replacing {
            Some(pick_id) => {
                sqlx::query_as(&format!(
                    r#"
                    UPDATE picks
                    SET team_code = $2, submitted_at = $3
                    WHERE pick_id = $1 AND status = 'pending'
                    RETURNING {}
                    "#,
                    PICK_COLUMNS
                ))
                .bind(pick_id)
                .bind(pick.team_code.as_str())
                .bind(pick.submitted_at)
                .fetch_optional(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!(
                    r#"
                    INSERT INTO picks (pick_id, participant_id, phase, week, team_code, status, submitted_at)
                    VALUES ($1, $2, $3, $4, $5, 'pending', $6)
                    RETURNING {}
                    "#,
                    PICK_COLUMNS
                ))
                .bind(Uuid::new_v4())
                .bind(pick.participant_id)
                .bind(pick.phase.as_str())
                .bind(pick.week)
                .bind(pick.team_code.as_str())
                .bind(pick.submitted_at)
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(map_pick_write_error)?;

        // An update that matched nothing lost the race against resolution.
        let row = row.ok_or(StorageError::SlotTaken)?;
        Pick::try_from(row)
    }

    async fn resolve_pick(
        &self,
        pick_id: Uuid,
        team: &TeamCode,
        status: PickStatus,
    ) -> Result<PickResolution> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<PickRow> = sqlx::query_as(&format!(
            r#"
            UPDATE picks
            SET status = $2
            WHERE pick_id = $1 AND status = 'pending' AND team_code = $3
            RETURNING {}
            "#,
            PICK_COLUMNS
        ))
        .bind(pick_id)
        .bind(status.as_str())
        .bind(team.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = updated else {
            tx.rollback().await?;
            let current = self.fetch_pick(pick_id).await?;
            return Ok(if current.team_code != *team {
                PickResolution::Superseded(current)
            } else if current.status == status {
                PickResolution::Unchanged(current)
            } else {
                PickResolution::Conflict(current)
            });
        };

        let pick = Pick::try_from(row)?;

        if status.eliminates() {
            sqlx::query(
                r#"
                UPDATE participants
                SET eliminated = TRUE
                WHERE participant_id = $1
                "#,
            )
            .bind(pick.participant_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(PickResolution::Applied(pick))
    }
}
