use std::sync::Arc;

use course_admin::api::{ServerConfig, router};
use course_admin::db;
use course_admin::state::AppState;
use course_admin::validation::{Schema, ValidationConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "course_admin=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::new_from_env()?;
    let schema = Schema::course(&ValidationConfig::new_from_env()?)?;

    let pool = db::connect(&config.database_url).await?;

    let state = AppState {
        db: pool,
        schema: Arc::new(schema),
    };

    let app = router(state, &config.prefix, &config.paths);

    info!("listening on http://{}{}", config.addr, config.prefix);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
