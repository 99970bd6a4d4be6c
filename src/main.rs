use fuhrpark::{app, config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "fuhrpark=debug,axum=info,tower_http=info".to_string());
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

    let config = AppConfig::from_env()?;
    let (state, fahrzeug_db, user_db) = AppState::init(config).await?;

    // Run migrations if present, one set per database
    if let Err(e) = sqlx::migrate!("./migrations/fahrzeuge").run(&fahrzeug_db).await {
        tracing::warn!(error = %e, "fahrzeug migrations failed; continuing");
    }
    if let Err(e) = sqlx::migrate!("./migrations/users").run(&user_db).await {
        tracing::warn!(error = %e, "user migrations failed; continuing");
    }

    let app = app::build_app(state);
    app::serve(app).await
}
