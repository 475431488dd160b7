use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::dto::leaderboard::{
    LeaderboardResponse, ParticipantStanding, StandingPick, StandingsSummary,
};
use crate::dto::picks::{GameInfo, PickHistoryEntry, PickHistoryResponse, TeamInfo};
use crate::error::{EngineError, EngineResult};
use crate::models::{Game, Pick, Slot, Team, TeamCode};
use crate::repository::PickStore;

/// Kickoff times and team names for decorating picks.
struct PickContext {
    kickoffs: HashMap<(Slot, TeamCode), DateTime<Utc>>,
    team_names: HashMap<TeamCode, String>,
}

impl PickContext {
    fn new(games: &[Game], teams: Vec<Team>) -> Self {
        let mut kickoffs = HashMap::new();
        for game in games {
            for team in [&game.home_team, &game.away_team] {
                kickoffs.insert((game.slot(), team.clone()), game.start_time);
            }
        }

        let team_names = teams.into_iter().map(|t| (t.code, t.name)).collect();

        Self {
            kickoffs,
            team_names,
        }
    }

    fn kickoff(&self, pick: &Pick) -> Option<DateTime<Utc>> {
        self.kickoffs
            .get(&(pick.slot(), pick.team_code.clone()))
            .copied()
    }

    fn team_name(&self, code: &TeamCode) -> Option<String> {
        self.team_names.get(code).cloned()
    }

    fn standing_pick(&self, pick: Pick) -> StandingPick {
        StandingPick {
            id: pick.pick_id,
            phase: pick.phase,
            week: pick.week,
            team_name: self.team_name(&pick.team_code),
            starts_at: self.kickoff(&pick),
            status: pick.status,
            team_code: pick.team_code,
        }
    }

    fn history_entry(&self, pick: Pick) -> PickHistoryEntry {
        PickHistoryEntry {
            id: pick.pick_id,
            phase: pick.phase,
            week: pick.week,
            status: pick.status,
            game: GameInfo {
                start_time: self.kickoff(&pick),
            },
            team: TeamInfo {
                name: self.team_name(&pick.team_code),
                code: pick.team_code,
            },
        }
    }
}

fn sort_by_slot(picks: &mut [Pick]) {
    picks.sort_by(|a, b| a.slot().cmp(&b.slot()));
}

/// Every participant with their ordered picks, split on the cached
/// `eliminated` flag alone.
pub async fn leaderboard(store: &dyn PickStore) -> EngineResult<LeaderboardResponse> {
    let participants = store.list_participants().await?;
    let picks = store.list_picks().await?;
    let games = store.list_games().await?;
    let teams = store.list_teams().await?;

    let context = PickContext::new(&games, teams);

    let mut picks_by_participant: HashMap<Uuid, Vec<Pick>> = HashMap::new();
    for pick in picks {
        picks_by_participant
            .entry(pick.participant_id)
            .or_default()
            .push(pick);
    }

    let mut response = LeaderboardResponse::default();
    for participant in participants {
        let mut picks = picks_by_participant
            .remove(&participant.participant_id)
            .unwrap_or_default();
        sort_by_slot(&mut picks);

        let standing = ParticipantStanding {
            id: participant.participant_id,
            name: participant.display_name,
            eliminated: participant.eliminated,
            picks: picks
                .into_iter()
                .map(|p| context.standing_pick(p))
                .collect(),
        };

        if participant.eliminated {
            response.eliminated.push(standing);
        } else {
            response.still_in.push(standing);
        }
    }

    Ok(response)
}

/// Sizes of both leaderboard partitions.
pub async fn summary(store: &dyn PickStore) -> EngineResult<StandingsSummary> {
    let participants = store.list_participants().await?;
    let eliminated = participants.iter().filter(|p| p.eliminated).count();

    Ok(StandingsSummary {
        still_in: participants.len() - eliminated,
        eliminated,
    })
}

/// One participant's picks ordered by phase and week.
pub async fn pick_history(
    store: &dyn PickStore,
    participant_id: Uuid,
) -> EngineResult<PickHistoryResponse> {
    store
        .find_participant(participant_id)
        .await?
        .ok_or(EngineError::NotFound("Participant"))?;

    let mut picks = store.picks_for_participant(participant_id).await?;
    sort_by_slot(&mut picks);
    let games = store.list_games().await?;
    let teams = store.list_teams().await?;

    let context = PickContext::new(&games, teams);

    Ok(PickHistoryResponse {
        picks: picks.into_iter().map(|p| context.history_entry(p)).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPick, Outcome, Phase, PickStatus};
    use crate::services::resolution::resolve_game;
    use crate::services::test_support::*;
    use chrono::Duration;

    async fn pick_for(store: &dyn PickStore, participant_id: Uuid, week: i32, team: &str) {
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
            .unwrap();
    }

    #[tokio::test]
    async fn leaderboard_partitions_on_elimination_with_full_history() {
        let store = seeded_store().await;
        let alice = register(&store, "Alice").await;
        let bob = register(&store, "Bob").await;
        let games = schedule_two_weeks(&store).await;
        pick_for(&store, alice, 2, "NE").await;
        pick_for(&store, alice, 1, "NYJ").await;
        pick_for(&store, bob, 1, "BUF").await;

        resolve_game(&store, games[0].game_id, "BUF", Outcome::Win)
            .await
            .unwrap();

        let board = leaderboard(&store).await.unwrap();

        assert_eq!(board.still_in.len(), 1);
        assert_eq!(board.eliminated.len(), 1);

        let still_in = &board.still_in[0];
        assert_eq!(still_in.id, alice);
        assert!(!still_in.eliminated);
        let weeks: Vec<i32> = still_in.picks.iter().map(|p| p.week).collect();
        assert_eq!(weeks, vec![1, 2]);
        assert_eq!(still_in.picks[0].status, PickStatus::Loss);
        assert_eq!(still_in.picks[0].starts_at, Some(kickoff()));
        assert_eq!(still_in.picks[0].team_name.as_deref(), Some("New York Jets"));
        assert_eq!(still_in.picks[1].status, PickStatus::Pending);

        let out = &board.eliminated[0];
        assert_eq!(out.id, bob);
        assert_eq!(out.picks.len(), 1);
        assert_eq!(out.picks[0].status, PickStatus::Win);

        let counts = summary(&store).await.unwrap();
        assert_eq!(counts.still_in, 1);
        assert_eq!(counts.eliminated, 1);
    }

    #[tokio::test]
    async fn participants_without_picks_are_still_in() {
        let store = seeded_store().await;
        let carol = register(&store, "Carol").await;

        let board = leaderboard(&store).await.unwrap();

        assert_eq!(board.still_in.len(), 1);
        assert_eq!(board.still_in[0].id, carol);
        assert!(board.still_in[0].picks.is_empty());
        assert!(board.eliminated.is_empty());
    }

    #[tokio::test]
    async fn history_carries_team_and_kickoff() {
        let store = seeded_store().await;
        let alice = register(&store, "Alice").await;
        schedule_two_weeks(&store).await;
        pick_for(&store, alice, 2, "DAL").await;
        pick_for(&store, alice, 1, "NYG").await;

        let history = pick_history(&store, alice).await.unwrap();

        assert_eq!(history.picks.len(), 2);
        assert_eq!(history.picks[0].week, 1);
        assert_eq!(history.picks[0].team.code.as_str(), "NYG");
        assert_eq!(
            history.picks[0].game.start_time,
            Some(kickoff() + Duration::hours(3))
        );
        assert_eq!(history.picks[1].team.name.as_deref(), Some("Dallas Cowboys"));

        let err = pick_history(&store, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }
}
