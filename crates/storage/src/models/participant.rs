use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub participant_id: Uuid,
    pub display_name: String,
    pub email: Option<String>,
    /// Cached; only ever set by outcome resolution, never cleared.
    pub eliminated: bool,
    pub created_at: DateTime<Utc>,
}

/// Registration data handed over by the identity provider.
#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub participant_id: Uuid,
    pub display_name: String,
    pub email: Option<String>,
}
