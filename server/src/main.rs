//! Student records server: reads settings from the environment, provisions the
//! database, and serves the API.
//!
//! Run from repo root: `cargo run -p student-records-server`

use std::sync::Arc;
use student_records::{app, ensure_database_exists, ensure_schema, init_tracing, AppConfig, AppState, PgStudentStore};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    init_tracing(&config.log_filter);

    ensure_database_exists(&config.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    ensure_schema(&pool).await?;

    let state = AppState::new(Arc::new(PgStudentStore::new(pool)), config.default_role_id);
    let router = app(state, config.body_limit_bytes);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
