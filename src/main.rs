use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pawtrack::app::build_router;
use pawtrack::auth::repository::{InMemoryRefreshTokenRepository, PostgresRefreshTokenRepository};
use pawtrack::auth::sweep::{start_token_sweep_task, SweepConfig};
use pawtrack::auth::token::TokenConfig;
use pawtrack::config::AppConfig;
use pawtrack::diary::repository::{InMemoryDiaryRepository, PostgresDiaryRepository};
use pawtrack::pets::repository::{InMemoryPetRepository, PostgresPetRepository};
use pawtrack::shared::AppState;
use pawtrack::users::repository::{InMemoryUserRepository, PostgresUserRepository};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pawtrack=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting pawtrack server");

    let config = AppConfig::from_env();
    let token_config = TokenConfig::from_config(&config);

    // Repositories via dependency injection: Postgres when DATABASE_URL
    // is set, in-memory otherwise (development mode, data is ephemeral)
    let state = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url)
                .await
                .expect("Failed to connect to database");
            info!("Connected to PostgreSQL");

            AppState::new(
                token_config,
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresRefreshTokenRepository::new(pool.clone())),
                Arc::new(PostgresPetRepository::new(pool.clone())),
                Arc::new(PostgresDiaryRepository::new(pool)),
            )
        }
        None => {
            info!("No DATABASE_URL set, using in-memory repositories");
            AppState::new(
                token_config,
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryRefreshTokenRepository::new()),
                Arc::new(InMemoryPetRepository::new()),
                Arc::new(InMemoryDiaryRepository::new()),
            )
        }
    };

    // Background sweep for expired refresh-token rows
    tokio::spawn(start_token_sweep_task(
        state.auth_service.clone(),
        SweepConfig {
            sweep_interval: Duration::from_secs(config.token_sweep_interval_secs),
        },
    ));

    let app = build_router(state, &config.cors_allowed_origins);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("Failed to bind port 3000");
    info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.expect("Server error");
}
