// handlers/mod.rs - Operation pipeline
//
// One file per operation. Each handler starts a request timer, then runs the
// phases in fixed order: identity → authorization → before-hook → persistence
// → after-hook. Any failure short-circuits as an ApiError.

pub mod create;
pub mod custom_logic;
pub mod delete;
pub mod list;
pub mod read;
pub mod update;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{evaluate, Authenticator};
use crate::config::{Definitions, ListConfig};
use crate::database::Store;
use crate::error::ApiError;
use crate::hooks::CustomLogicExecutor;
use crate::metrics;
use crate::model::{AuthPolicy, Object};

/// Everything a request needs, fixed at startup and shared by all requests.
#[derive(Clone)]
pub struct Pipeline {
    store: Arc<dyn Store>,
    authenticator: Arc<dyn Authenticator>,
    executor: Arc<dyn CustomLogicExecutor>,
    definitions: Arc<Definitions>,
    list: ListConfig,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn Store>,
        authenticator: Arc<dyn Authenticator>,
        executor: Arc<dyn CustomLogicExecutor>,
        definitions: Definitions,
        list: ListConfig,
    ) -> Self {
        Self {
            store,
            authenticator,
            executor,
            definitions: Arc::new(definitions),
            list,
        }
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    async fn fetch(&self, id: &str) -> Result<Object, ApiError> {
        self.store.get_object(id).await?.ok_or_else(|| ApiError::not_found(id))
    }

    fn authorize(&self, policy: Option<&AuthPolicy>, identity: &str, obj: &Object, operation: &str) -> Result<(), ApiError> {
        if evaluate(policy, identity, obj).is_allowed() {
            return Ok(());
        }
        tracing::warn!(
            "Denied {} on {} for user {}",
            operation,
            obj.id.as_deref().unwrap_or("<unknown>"),
            identity
        );
        Err(ApiError::Forbidden)
    }
}

/// Build the HTTP surface. CORS is outermost so preflights never reach a handler.
pub fn router(pipeline: Pipeline) -> Router {
    Router::new()
        .route("/", post(create::create_object).get(list::list_objects))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/:id", get(read::read_object).delete(delete::delete_object))
        .route("/:id/:action", post(update::update_object))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(pipeline)
}

/// GET /metrics - Prometheus text exposition
async fn metrics_handler() -> Result<impl IntoResponse, ApiError> {
    let body = metrics::gather().map_err(|e| ApiError::internal_server_error(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

/// GET /health - storage reachability
async fn health_handler(State(pipeline): State<Pipeline>) -> Result<impl IntoResponse, ApiError> {
    pipeline.store.ping().await.map_err(|e| {
        tracing::error!("Health check failed: {}", e);
        ApiError::service_unavailable("database unreachable")
    })?;
    Ok((StatusCode::OK, Json(json!({ "status": "ok" }))))
}
