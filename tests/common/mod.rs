#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;

use widget_proxy::database::{DatabaseManager, PgStore};
use widget_proxy::config::DatabaseConfig;
use widget_proxy::model::ApiDefinition;

/// Serve `app` on a free local port and return its base URL (with trailing slash).
pub async fn spawn_stub(app: Router) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind stub on {}", port))?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://127.0.0.1:{}/", port))
}

/// Postgres-backed tests run only when DATABASE_URL is set.
pub fn database_url() -> Option<String> {
    match std::env::var("DATABASE_URL") {
        Ok(url) if !url.is_empty() => Some(url),
        _ => {
            eprintln!("DATABASE_URL not set, skipping database test");
            None
        }
    }
}

/// A store on a fresh, uniquely named table so tests do not see each other's rows.
pub async fn pg_store(url: String, api: ApiDefinition) -> Result<PgStore> {
    let config = DatabaseConfig {
        url: Some(url),
        table_name: format!("objects_test_{}", uuid::Uuid::new_v4().simple()),
        max_connections: 2,
        connection_timeout: 5,
    };
    let pool = DatabaseManager::connect(&config).await?;
    Ok(PgStore::new(pool, &config.table_name, Arc::new(api))?)
}
