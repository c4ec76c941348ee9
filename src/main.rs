use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use widget_proxy::auth::{Authenticator, JwtAuthenticator, ParseAuthenticator};
use widget_proxy::config::{self, Definitions, IdentityMode};
use widget_proxy::database::{DatabaseManager, InstrumentedStore, PgStore, Store};
use widget_proxy::handlers::{router, Pipeline};
use widget_proxy::hooks::HttpCustomLogicExecutor;

#[derive(Parser)]
#[command(name = "widget-proxy")]
#[command(about = "CRUD proxy with per-tenant authorization and custom logic hooks")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "API definition file (overrides API_PATH)")]
    api: Option<String>,

    #[arg(long, help = "Authorization policy file (overrides AUTH_PATH)")]
    auth: Option<String>,

    #[arg(long, help = "Custom logic file (overrides CUSTOM_LOGIC_PATH)")]
    custom_logic: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let mut settings = config::config().clone();
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(path) = args.api {
        settings.definitions.api_path = path;
    }
    if let Some(path) = args.auth {
        settings.definitions.auth_path = path;
    }
    if let Some(path) = args.custom_logic {
        settings.definitions.custom_logic_path = path;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.server.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::info!("Starting widget proxy in {:?} mode", settings.environment);

    let definitions = Definitions::load(&settings.definitions).context("failed to load definitions")?;
    tracing::info!(
        "Loaded API '{}' with {} filter field(s)",
        definitions.api.name,
        definitions.api.filter_fields().len()
    );

    let pool = DatabaseManager::connect(&settings.database)
        .await
        .context("failed to connect to database")?;
    let store = PgStore::new(pool.clone(), &settings.database.table_name, Arc::new(definitions.api.clone()))?;
    let store = InstrumentedStore::new(store);
    store.create_schema().await.context("failed to create schema")?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.custom_logic.timeout_secs))
        .build()?;
    let authenticator: Arc<dyn Authenticator> = match settings.identity.mode {
        IdentityMode::Parse => Arc::new(
            ParseAuthenticator::new(http.clone(), &settings.identity.parse_url, &settings.identity.parse_app_id)
                .context("invalid PARSE_URL")?,
        ),
        IdentityMode::Jwt => Arc::new(JwtAuthenticator::new(&settings.identity.jwt_secret)),
    };
    let executor = HttpCustomLogicExecutor::with_client(http, settings.custom_logic.url.clone());

    let pipeline = Pipeline::new(
        Arc::new(store),
        authenticator,
        Arc::new(executor),
        definitions,
        settings.list.clone(),
    );

    let bind_addr = format!("0.0.0.0:{}", settings.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
