use axum::{
    Router, middleware,
    routing::{get, put},
};

use super::handlers::{get_participant, register_participant};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/participants/:participant_id", put(register_participant))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/api/participants/:participant_id", get(get_participant))
        .merge(protected)
}
