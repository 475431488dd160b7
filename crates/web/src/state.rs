use storage::Database;
use storage::services::EngineSettings;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: EngineSettings,
}

impl AppState {
    pub fn new(db: Database, settings: EngineSettings) -> Self {
        Self { db, settings }
    }
}
