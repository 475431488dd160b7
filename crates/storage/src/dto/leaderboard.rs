use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Phase, PickStatus, TeamCode};

/// Participants partitioned by elimination
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardResponse {
    #[serde(rename = "stillIn")]
    pub still_in: Vec<ParticipantStanding>,
    pub eliminated: Vec<ParticipantStanding>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantStanding {
    pub id: Uuid,
    pub name: String,
    pub eliminated: bool,
    pub picks: Vec<StandingPick>,
}

/// A pick as shown on the leaderboard. `starts_at` lets the caller hide
/// pending picks until kickoff.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StandingPick {
    pub id: Uuid,
    pub phase: Phase,
    pub week: i32,
    #[schema(value_type = String)]
    pub team_code: TeamCode,
    pub team_name: Option<String>,
    pub status: PickStatus,
    pub starts_at: Option<DateTime<Utc>>,
}

/// Partition sizes returned after a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StandingsSummary {
    pub still_in: usize,
    pub eliminated: usize,
}
