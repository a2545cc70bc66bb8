mod app;
mod auth;
mod config;
mod db;
mod error;
mod extract;
mod state;
#[cfg(test)]
mod testing;
mod todos;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "todolist=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    // Without signing settings no token can ever be issued; refuse to start.
    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
        e
    })?;

    let db = db::connect(&config.database).await?;
    db::migrate(&db).await?;

    let app_state = AppState::postgres(config, db)?;
    app::serve(app::build_app(app_state)).await
}
