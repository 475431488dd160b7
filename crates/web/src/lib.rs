use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod error;
pub mod features;
pub mod middleware;
pub mod state;

use features::{games, leaderboard, participants, picks};
use middleware::auth::ApiKeys;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::picks::handlers::get_available_teams,
        features::picks::handlers::get_pick_history,
        features::picks::handlers::submit_pick,
        features::leaderboard::handlers::get_leaderboard,
        features::games::handlers::list_games,
        features::games::handlers::list_teams,
        features::games::handlers::create_game,
        features::games::handlers::resolve_game,
        features::participants::handlers::get_participant,
        features::participants::handlers::register_participant,
    ),
    components(
        schemas(
            storage::dto::picks::AvailableTeamsResponse,
            storage::dto::picks::SubmitPickRequest,
            storage::dto::picks::SubmitPickResponse,
            storage::dto::picks::PickResponse,
            storage::dto::picks::PickHistoryResponse,
            storage::dto::picks::PickHistoryEntry,
            storage::dto::picks::TeamInfo,
            storage::dto::picks::GameInfo,
            storage::dto::leaderboard::LeaderboardResponse,
            storage::dto::leaderboard::ParticipantStanding,
            storage::dto::leaderboard::StandingPick,
            storage::dto::leaderboard::StandingsSummary,
            storage::dto::games::CreateGameRequest,
            storage::dto::games::ResolveGameRequest,
            storage::dto::games::ResolveGameResponse,
            storage::dto::games::GameResponse,
            storage::dto::games::GameResultInfo,
            storage::dto::games::TeamResponse,
            storage::dto::participants::RegisterParticipantRequest,
            storage::dto::participants::ParticipantResponse,
            storage::models::Phase,
            storage::models::Outcome,
            storage::models::PickStatus,
        )
    ),
    tags(
        (name = "picks", description = "Weekly pick availability, submission and history"),
        (name = "leaderboard", description = "Survivor standings"),
        (name = "games", description = "Schedule and results feed"),
        (name = "participants", description = "Participant registration"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

/// Builds the full router: every feature, Swagger UI and CORS.
pub fn app(state: AppState, api_keys: ApiKeys) -> Router {
    Router::new()
        .merge(picks::routes())
        .merge(leaderboard::routes())
        .merge(games::routes(api_keys.clone()))
        .merge(participants::routes(api_keys))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
