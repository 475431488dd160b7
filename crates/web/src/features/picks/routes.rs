use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{get_available_teams, get_pick_history, submit_pick};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/picks/available/:participant_id", get(get_available_teams))
        .route("/api/picks/history/:participant_id", get(get_pick_history))
        .route("/api/picks/submit", post(submit_pick))
}
