use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{create_game, list_games, list_teams, resolve_game};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/games", post(create_game))
        .route("/api/games/:game_id/result", post(resolve_game))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/api/games", get(list_games))
        .route("/api/teams", get(list_teams))
        .merge(protected)
}
