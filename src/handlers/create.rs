use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::Response,
};

use super::Pipeline;
use crate::error::ApiError;
use crate::metrics::RequestTimer;
use crate::model::Object;
use crate::types::Operation;

/// POST / - create an object owned by the caller
pub async fn create_object(State(pipeline): State<Pipeline>, headers: HeaderMap, body: Bytes) -> Result<Response, ApiError> {
    let _timer = RequestTimer::start(Operation::Create.as_str());
    pipeline.create(&headers, body).await
}

impl Pipeline {
    pub async fn create(&self, headers: &HeaderMap, body: Bytes) -> Result<Response, ApiError> {
        let operation = Operation::Create.as_str();
        let identity = self.authenticator.user_id(headers).await?;

        let logic = self.definitions.custom_logic.for_create();
        let decoded = self.apply_before(body, logic, operation).await?;

        // Only tenant fields survive; the server owns id, owner and timestamps
        let obj = Object {
            created_by: identity,
            fields: decoded.fields,
            ..Default::default()
        };
        let created = self.store.create_object(obj).await?;
        tracing::debug!("Created object {:?} for {}", created.id, created.created_by);

        self.apply_after(&created, logic, operation, false).await
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::tests::{body_json, Harness, OWNER};
    use crate::hooks::Phase;
    use crate::testing::ScriptedExecutor;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn stamps_owner_and_returns_stored_object() {
        let harness = Harness::plain(OWNER);
        let response = harness.send(Method::POST, "/", Some(json!({ "name": "a" }))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["createdBy"], OWNER);
        assert_eq!(body["name"], "a");

        let stored = harness.store.stored(body["id"].as_str().unwrap()).unwrap();
        assert_eq!(body, serde_json::to_value(&stored).unwrap());
    }

    #[tokio::test]
    async fn client_cannot_choose_owner_or_id() {
        let harness = Harness::plain(OWNER);
        let payload = json!({ "id": "chosen", "createdBy": "mallory", "name": "a" });
        let body = body_json(harness.send(Method::POST, "/", Some(payload)).await).await;

        assert_eq!(body["createdBy"], OWNER);
        assert_ne!(body["id"], "chosen");
    }

    #[tokio::test]
    async fn hook_output_cannot_choose_owner() {
        let executor = ScriptedExecutor::new().respond(Phase::Before, "create", json!({ "createdBy": "mallory", "name": "hooked" }));
        let harness = Harness::new(OWNER, executor, json!({ "create": { "before": "beforeCreate" } }));

        let body = body_json(harness.send(Method::POST, "/", Some(json!({ "name": "a" }))).await).await;
        assert_eq!(body["createdBy"], OWNER);
        assert_eq!(body["name"], "hooked");
    }

    #[tokio::test]
    async fn after_hook_output_is_the_response() {
        let executor = ScriptedExecutor::new().respond(Phase::After, "create", json!({ "wrapped": true }));
        let harness = Harness::new(OWNER, executor, json!({ "create": { "after": "afterCreate" } }));

        let response = harness.send(Method::POST, "/", Some(json!({ "name": "a" }))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "wrapped": true }));

        // The after-hook saw the persisted object
        let calls = harness.executor.calls();
        assert_eq!(calls.len(), 1);
        let sent: serde_json::Value = serde_json::from_slice(&calls[0].2).unwrap();
        assert_eq!(sent["createdBy"], OWNER);
        assert!(sent["id"].is_string());
    }

    #[tokio::test]
    async fn failing_before_hook_skips_persistence() {
        let executor = ScriptedExecutor::new().fail(Phase::Before, "create", 500);
        let harness = Harness::new(OWNER, executor, json!({ "create": { "before": "beforeCreate" } }));

        let response = harness.send(Method::POST, "/", Some(json!({ "name": "a" }))).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(harness.store.calls().is_empty());
    }

    #[tokio::test]
    async fn non_object_hook_output_is_invalid() {
        let executor = ScriptedExecutor::new().respond_raw(Phase::Before, "create", b"[1,2]");
        let harness = Harness::new(OWNER, executor, json!({ "create": { "before": "beforeCreate" } }));

        let response = harness.send(Method::POST, "/", Some(json!({ "name": "a" }))).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(harness.store.calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let harness = Harness::plain(OWNER);
        let response = harness.send(Method::POST, "/", Some(json!("just a string"))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(harness.store.calls().is_empty());
    }
}
