use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Game, GameResult, Outcome, Pick, PickStatus, TeamCode};
use crate::repository::{PickResolution, PickStore};

#[derive(Debug, Clone)]
pub struct ResolvedGame {
    pub game: Game,
    /// Picks whose status changed during this call. Empty on a repeat call.
    pub updated_picks: Vec<Pick>,
}

/// Applies a final result to every pick on `game_id`.
///
/// Reversed rule: a picked team that wins eliminates its picker, a loss or
/// push keeps them alive. Repeating the same result is a no-op; a different
/// result for an already resolved game or pick fails with `AlreadyResolved`.
pub async fn resolve_game(
    store: &dyn PickStore,
    game_id: Uuid,
    team: &str,
    outcome: Outcome,
) -> EngineResult<ResolvedGame> {
    let game = store
        .find_game(game_id)
        .await?
        .ok_or(EngineError::NotFound("Game"))?;

    let team = TeamCode::parse(team).map_err(EngineError::ValidationFailed)?;
    if !game.involves(&team) {
        return Err(EngineError::ValidationFailed(format!(
            "{} did not play in game {}",
            team, game_id
        )));
    }
    let result = GameResult { team, outcome };

    if let Some(existing) = &game.result
        && !game.same_result(existing, &result)
    {
        return Err(EngineError::AlreadyResolved(game_id));
    }

    let picks = store.picks_for_game(&game).await?;
    let mut plan = Vec::with_capacity(picks.len());
    for pick in picks {
        let status = game
            .outcome_for(&result, &pick.team_code)
            .map(PickStatus::from)
            .ok_or(EngineError::NotFound("Game"))?;

        match pick.status {
            current if current == status => {}
            PickStatus::Pending => plan.push((pick, status)),
            _ => return Err(EngineError::AlreadyResolved(game_id)),
        }
    }

    let stored = store.record_game_result(game_id, &result).await?;
    match &stored.result {
        Some(recorded) if stored.same_result(recorded, &result) => {}
        _ => return Err(EngineError::AlreadyResolved(game_id)),
    }

    let mut updated_picks = Vec::with_capacity(plan.len());
    for (pick, status) in plan {
        match store
            .resolve_pick(pick.pick_id, &pick.team_code, status)
            .await?
        {
            PickResolution::Applied(updated) => {
                if status.eliminates() {
                    tracing::info!(
                        participant_id = %updated.participant_id,
                        team = %updated.team_code,
                        week = updated.week,
                        "Participant eliminated"
                    );
                }
                updated_picks.push(updated);
            }
            PickResolution::Unchanged(_) => {}
            PickResolution::Superseded(current) => {
                tracing::warn!(
                    pick_id = %current.pick_id,
                    team = %current.team_code,
                    "Pick replaced during resolution, skipped"
                );
            }
            PickResolution::Conflict(_) => return Err(EngineError::AlreadyResolved(game_id)),
        }
    }

    tracing::info!(
        game_id = %game_id,
        result_team = %result.team,
        outcome = %result.outcome,
        updated = updated_picks.len(),
        "Game resolved"
    );

    Ok(ResolvedGame {
        game: stored,
        updated_picks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPick, Phase};
    use crate::services::test_support::*;
    use chrono::Duration;

    async fn pick_for(store: &dyn PickStore, participant_id: Uuid, week: i32, team: &str) -> Pick {
        store
            .record_pick(
                &NewPick {
                    participant_id,
                    phase: Phase::Reg,
                    week,
                    team_code: code(team),
                    submitted_at: kickoff() - Duration::hours(2),
                },
                None,
            )
            .await
            .unwrap()
    }

    async fn eliminated(store: &dyn PickStore, participant_id: Uuid) -> bool {
        store
            .find_participant(participant_id)
            .await
            .unwrap()
            .unwrap()
            .eliminated
    }

    #[tokio::test]
    async fn winning_pick_eliminates_and_losing_pick_survives() {
        let store = seeded_store().await;
        let alice = register(&store, "Alice").await;
        let bob = register(&store, "Bob").await;
        let games = schedule_two_weeks(&store).await;
        pick_for(&store, alice, 1, "NYJ").await;
        pick_for(&store, bob, 1, "BUF").await;

        let resolved = resolve_game(&store, games[0].game_id, "NYJ", Outcome::Win)
            .await
            .unwrap();

        assert_eq!(resolved.updated_picks.len(), 2);
        assert!(eliminated(&store, alice).await);
        assert!(!eliminated(&store, bob).await);
        let bob_pick = &store.picks_for_participant(bob).await.unwrap()[0];
        assert_eq!(bob_pick.status, PickStatus::Loss);
    }

    #[tokio::test]
    async fn push_keeps_everyone_alive() {
        let store = seeded_store().await;
        let alice = register(&store, "Alice").await;
        let games = schedule_two_weeks(&store).await;
        pick_for(&store, alice, 1, "BUF").await;

        resolve_game(&store, games[0].game_id, "NYJ", Outcome::Push)
            .await
            .unwrap();

        let pick = &store.picks_for_participant(alice).await.unwrap()[0];
        assert_eq!(pick.status, PickStatus::Push);
        assert!(!eliminated(&store, alice).await);
    }

    #[tokio::test]
    async fn repeating_the_same_result_is_a_no_op() {
        let store = seeded_store().await;
        let alice = register(&store, "Alice").await;
        let games = schedule_two_weeks(&store).await;
        pick_for(&store, alice, 1, "NYJ").await;

        let first = resolve_game(&store, games[0].game_id, "NYJ", Outcome::Loss)
            .await
            .unwrap();
        let before = store.picks_for_participant(alice).await.unwrap();

        // Same result nominated from the other side.
        let second = resolve_game(&store, games[0].game_id, "BUF", Outcome::Win)
            .await
            .unwrap();
        let after = store.picks_for_participant(alice).await.unwrap();

        assert_eq!(first.updated_picks.len(), 1);
        assert!(second.updated_picks.is_empty());
        assert_eq!(before, after);
        assert_eq!(after[0].status, PickStatus::Loss);
        assert!(!eliminated(&store, alice).await);
    }

    #[tokio::test]
    async fn conflicting_result_is_rejected_and_elimination_sticks() {
        let store = seeded_store().await;
        let alice = register(&store, "Alice").await;
        let games = schedule_two_weeks(&store).await;
        pick_for(&store, alice, 1, "NYJ").await;

        resolve_game(&store, games[0].game_id, "NYJ", Outcome::Win)
            .await
            .unwrap();
        let err = resolve_game(&store, games[0].game_id, "NYJ", Outcome::Loss)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "already_resolved");
        assert!(eliminated(&store, alice).await);
        let pick = &store.picks_for_participant(alice).await.unwrap()[0];
        assert_eq!(pick.status, PickStatus::Win);
    }

    #[tokio::test]
    async fn later_loss_never_clears_elimination() {
        let store = seeded_store().await;
        let alice = register(&store, "Alice").await;
        let games = schedule_two_weeks(&store).await;
        pick_for(&store, alice, 1, "NYJ").await;
        pick_for(&store, alice, 2, "NE").await;

        resolve_game(&store, games[0].game_id, "NYJ", Outcome::Win)
            .await
            .unwrap();
        resolve_game(&store, games[2].game_id, "NE", Outcome::Loss)
            .await
            .unwrap();

        assert!(eliminated(&store, alice).await);
    }

    #[tokio::test]
    async fn picks_on_other_games_are_untouched() {
        let store = seeded_store().await;
        let alice = register(&store, "Alice").await;
        let games = schedule_two_weeks(&store).await;
        pick_for(&store, alice, 1, "DAL").await;

        let resolved = resolve_game(&store, games[0].game_id, "NYJ", Outcome::Win)
            .await
            .unwrap();

        assert!(resolved.updated_picks.is_empty());
        let pick = &store.picks_for_participant(alice).await.unwrap()[0];
        assert_eq!(pick.status, PickStatus::Pending);
    }

    #[tokio::test]
    async fn nominated_team_must_play_in_the_game() {
        let store = seeded_store().await;
        let games = schedule_two_weeks(&store).await;

        let err = resolve_game(&store, games[0].game_id, "DAL", Outcome::Win)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation_failed");

        let err = resolve_game(&store, Uuid::new_v4(), "NYJ", Outcome::Win)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }
}
