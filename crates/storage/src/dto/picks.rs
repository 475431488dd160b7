use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Phase, Pick, PickStatus, TeamCode};

/// Teams a participant may pick for the current slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AvailableTeamsResponse {
    pub week: i32,
    pub phase: Phase,
    #[schema(value_type = Vec<String>)]
    pub available_teams: Vec<TeamCode>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailableTeamsQuery {
    /// `1` or `true` lists teams whose game already kicked off
    #[serde(default, rename = "ignoreLock", deserialize_with = "deserialize_flag")]
    #[param(value_type = Option<String>)]
    pub ignore_lock: bool,
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") | Some("0") | Some("false") => Ok(false),
        Some("1") | Some("true") => Ok(true),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid flag value '{}'",
            other
        ))),
    }
}

/// Request payload for submitting a pick
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitPickRequest {
    pub user_id: Uuid,

    pub week: i32,

    #[validate(length(min = 1, message = "Team is required"))]
    pub team: String,

    pub phase: Phase,

    /// Only honoured when the server allows lock overrides
    #[serde(default)]
    pub ignore_lock: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PickResponse {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub phase: Phase,
    pub week: i32,
    #[schema(value_type = String)]
    pub team: TeamCode,
    pub status: PickStatus,
    pub submitted_at: DateTime<Utc>,
}

impl From<Pick> for PickResponse {
    fn from(pick: Pick) -> Self {
        Self {
            id: pick.pick_id,
            participant_id: pick.participant_id,
            phase: pick.phase,
            week: pick.week,
            team: pick.team_code,
            status: pick.status,
            submitted_at: pick.submitted_at,
        }
    }
}

/// Accepted pick together with the participant's refreshed availability
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitPickResponse {
    pub pick: PickResponse,
    pub available: AvailableTeamsResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PickHistoryResponse {
    pub picks: Vec<PickHistoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PickHistoryEntry {
    pub id: Uuid,
    pub phase: Phase,
    pub week: i32,
    pub status: PickStatus,
    pub team: TeamInfo,
    pub game: GameInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamInfo {
    #[schema(value_type = String)]
    pub code: TeamCode,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GameInfo {
    pub start_time: Option<DateTime<Utc>>,
}
