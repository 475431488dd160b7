use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Outcome, Phase, Slot, TeamCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PickStatus {
    Pending,
    Win,
    Loss,
    Push,
}

impl PickStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Win => "win",
            Self::Loss => "loss",
            Self::Push => "push",
        }
    }

    /// Reversed rule: the picked team winning outright eliminates the picker.
    pub fn eliminates(&self) -> bool {
        matches!(self, Self::Win)
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl From<Outcome> for PickStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => Self::Win,
            Outcome::Loss => Self::Loss,
            Outcome::Push => Self::Push,
        }
    }
}

impl fmt::Display for PickStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PickStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "win" => Ok(Self::Win),
            "loss" => Ok(Self::Loss),
            "push" => Ok(Self::Push),
            other => Err(format!("unknown pick status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub pick_id: Uuid,
    pub participant_id: Uuid,
    pub phase: Phase,
    pub week: i32,
    pub team_code: TeamCode,
    pub status: PickStatus,
    pub submitted_at: DateTime<Utc>,
}

impl Pick {
    pub fn slot(&self) -> Slot {
        Slot::new(self.phase, self.week)
    }
}

#[derive(Debug, Clone)]
pub struct NewPick {
    pub participant_id: Uuid,
    pub phase: Phase,
    pub week: i32,
    pub team_code: TeamCode,
    pub submitted_at: DateTime<Utc>,
}
