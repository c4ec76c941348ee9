use axum::{
    body::Bytes,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::Pipeline;
use crate::error::ApiError;
use crate::hooks::Phase;
use crate::model::{CustomLogic, Object};

impl Pipeline {
    /// Run the before-hook (if any) over a raw payload and decode the result.
    ///
    /// Without a hook the client payload itself is decoded, so a malformed
    /// body is the client's fault; with a hook it is the hook's.
    pub(super) async fn apply_before(
        &self,
        payload: Bytes,
        logic: Option<&CustomLogic>,
        operation: &str,
    ) -> Result<Object, ApiError> {
        if !logic.is_some_and(CustomLogic::has_before) {
            return Object::from_slice(&payload).map_err(|e| ApiError::invalid_json(format!("invalid request body: {}", e)));
        }

        tracing::debug!("Running before-hook for {}", operation);
        let output = self.executor.execute(payload, Phase::Before, operation).await?;
        Object::from_slice(&output).map_err(|e| {
            tracing::error!("Before-hook for {} returned an undecodable body: {}", operation, e);
            ApiError::invalid_hook_response(format!("custom logic returned an invalid object: {}", e))
        })
    }

    /// Run the before-hook purely as a gate; its output is ignored.
    pub(super) async fn check_before(&self, obj: &Object, logic: Option<&CustomLogic>, operation: &str) -> Result<(), ApiError> {
        if !logic.is_some_and(CustomLogic::has_before) {
            return Ok(());
        }
        tracing::debug!("Running before-hook for {}", operation);
        self.executor.execute(encode(obj)?, Phase::Before, operation).await?;
        Ok(())
    }

    /// Build the success response from the after-hook output, or from `obj`
    /// itself when no after-hook is configured. `empty_without_hook` turns the
    /// hookless response into a bare 204.
    pub(super) async fn apply_after(
        &self,
        obj: &Object,
        logic: Option<&CustomLogic>,
        operation: &str,
        empty_without_hook: bool,
    ) -> Result<Response, ApiError> {
        if !logic.is_some_and(CustomLogic::has_after) {
            if empty_without_hook {
                return Ok(StatusCode::NO_CONTENT.into_response());
            }
            return Ok(Json(obj).into_response());
        }

        tracing::debug!("Running after-hook for {}", operation);
        let output = self.executor.execute(encode(obj)?, Phase::After, operation).await?;
        if let Err(e) = serde_json::from_slice::<Value>(&output) {
            tracing::error!("After-hook for {} returned invalid JSON: {}", operation, e);
            return Err(ApiError::invalid_hook_response(format!("custom logic returned invalid JSON: {}", e)));
        }

        Ok(([(header::CONTENT_TYPE, "application/json")], output).into_response())
    }
}

fn encode(obj: &Object) -> Result<Bytes, ApiError> {
    obj.to_vec()
        .map(Bytes::from)
        .map_err(|e| ApiError::internal_server_error(format!("failed to serialize object: {}", e)))
}
