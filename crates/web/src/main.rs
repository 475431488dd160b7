use anyhow::Context;
use storage::Database;
use storage::services::EngineSettings;
use web::config::Config;
use web::middleware::auth::ApiKeys;
use web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting survivor pool API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    let db = match &config.database_url {
        Some(database_url) => {
            tracing::info!(
                "Connecting to database at: {}",
                database_url.split('@').next_back().unwrap_or("unknown")
            );
            let db = Database::new(database_url)
                .await
                .context("Failed to initialize database")?;
            tracing::info!("Database connection established");
            db
        }
        None => {
            tracing::warn!("DATABASE_URL not set, picks are kept in memory and lost on restart");
            Database::in_memory()
        }
    };

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let seeded = db
        .seed_reference_data()
        .await
        .context("Failed to seed team reference data")?;
    tracing::info!("Seeded {} teams", seeded);

    let settings = EngineSettings {
        allow_pending_override: config.allow_pending_override,
        allow_lock_override: config.allow_lock_override,
        read_retries: config.read_retries,
    };

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("API_KEYS is empty, schedule and result feeds will reject every request");
    }

    let app = web::app(AppState::new(db, settings), api_keys);

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Starting server at http://{}", bind_address);

    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app).await?;

    Ok(())
}
