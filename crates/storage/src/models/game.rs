use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Phase, Slot, TeamCode};

/// Final result of a game from one side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Push,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loss => "loss",
            Self::Push => "push",
        }
    }

    /// The same result seen from the opposing side.
    pub fn flipped(self) -> Self {
        match self {
            Self::Win => Self::Loss,
            Self::Loss => Self::Win,
            Self::Push => Self::Push,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(Self::Win),
            "loss" => Ok(Self::Loss),
            "push" => Ok(Self::Push),
            other => Err(format!("unknown outcome '{}'", other)),
        }
    }
}

/// Result posted by the score feed: `team` nominates the side `outcome`
/// refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub team: TeamCode,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub game_id: Uuid,
    pub phase: Phase,
    pub week: i32,
    pub home_team: TeamCode,
    pub away_team: TeamCode,
    pub start_time: DateTime<Utc>,
    pub result: Option<GameResult>,
}

impl Game {
    pub fn slot(&self) -> Slot {
        Slot::new(self.phase, self.week)
    }

    /// Inclusive: a game kicking off exactly at `now` is locked.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_time
    }

    pub fn involves(&self, team: &TeamCode) -> bool {
        &self.home_team == team || &self.away_team == team
    }

    /// Outcome of `team` under `result`, or `None` if `team` did not play or
    /// the result nominates a side that is not in this game.
    pub fn outcome_for(&self, result: &GameResult, team: &TeamCode) -> Option<Outcome> {
        if !self.involves(team) || !self.involves(&result.team) {
            return None;
        }
        if &result.team == team {
            Some(result.outcome)
        } else {
            Some(result.outcome.flipped())
        }
    }

    /// Whether two results describe the same final score, regardless of
    /// which side each one nominates.
    pub fn same_result(&self, a: &GameResult, b: &GameResult) -> bool {
        self.outcome_for(a, &self.home_team) == self.outcome_for(b, &self.home_team)
    }
}

/// Schedule row supplied by the external feed.
#[derive(Debug, Clone)]
pub struct NewGame {
    pub phase: Phase,
    pub week: i32,
    pub home_team: TeamCode,
    pub away_team: TeamCode,
    pub start_time: DateTime<Utc>,
}
