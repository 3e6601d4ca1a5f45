mod app;
mod config;
mod error;
mod history;
mod lookups;
mod products;
mod records;
mod session;
mod state;
mod suggestions;
mod sync;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "nutriscan=debug,axum=info,tower_http=info".to_string());
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

    let app_state = state::AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations/remote").run(&app_state.db).await {
        tracing::warn!(error = %e, "record store migration failed; continuing");
    }

    // Bring the local history up to date for the configured device user, if any.
    if let Ok(raw) = std::env::var("DEVICE_USER_ID") {
        match raw.parse::<uuid::Uuid>() {
            Ok(user_id) => {
                let session = session::Session::signed_in(user_id);
                if let Err(e) = app_state.sync.resync(&session).await {
                    tracing::warn!(error = %e, "startup resync failed; serving cached history");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "DEVICE_USER_ID is not a UUID; skipping startup resync")
            }
        }
    }

    app::serve(app::build_app(app_state)).await
}
