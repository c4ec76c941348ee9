use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};

use super::Pipeline;
use crate::error::ApiError;
use crate::metrics::RequestTimer;
use crate::types::Operation;

/// POST /:id/:action - apply a named update action
pub async fn update_object(
    State(pipeline): State<Pipeline>,
    Path((id, action)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    // Undeclared actions share one label so the URL cannot mint new series
    let label = match pipeline.definitions().api.action(&action) {
        Some(declared) => declared.name.as_str(),
        None => Operation::Update.as_str(),
    };
    let _timer = RequestTimer::start(label);
    pipeline.update(&headers, &id, &action, body).await
}

impl Pipeline {
    pub async fn update(&self, headers: &HeaderMap, id: &str, action: &str, body: Bytes) -> Result<Response, ApiError> {
        let identity = self.authenticator.user_id(headers).await?;

        if self.definitions.api.action(action).is_none() {
            return Err(ApiError::unknown_action(action));
        }

        let target = self.fetch(id).await?;
        self.authorize(self.definitions.auth.update_policy(action), &identity, &target, action)?;

        let logic = self.definitions.custom_logic.for_action(action);
        let mut patch = self.apply_before(body, logic, action).await?;
        patch.id = target.id.clone();

        let updated = self.store.update_object(patch, action).await?;
        tracing::debug!("Applied {} to object {}", action, id);

        self.apply_after(&updated, logic, action, false).await
    }
}
