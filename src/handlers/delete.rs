use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};

use super::Pipeline;
use crate::error::ApiError;
use crate::metrics::RequestTimer;
use crate::types::Operation;

/// DELETE /:id - remove an object; 204 unless an after-hook supplies a body
pub async fn delete_object(
    State(pipeline): State<Pipeline>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let _timer = RequestTimer::start(Operation::Delete.as_str());
    pipeline.delete(&headers, &id).await
}

impl Pipeline {
    pub async fn delete(&self, headers: &HeaderMap, id: &str) -> Result<Response, ApiError> {
        let operation = Operation::Delete.as_str();
        let identity = self.authenticator.user_id(headers).await?;

        let target = self.fetch(id).await?;
        self.authorize(self.definitions.auth.delete_policy(), &identity, &target, operation)?;

        let logic = self.definitions.custom_logic.for_delete();
        self.check_before(&target, logic, operation).await?;

        self.store.delete_object(id).await?;
        tracing::debug!("Deleted object {}", id);

        // The after-hook sees the object as it was before deletion
        self.apply_after(&target, logic, operation, true).await
    }
}
