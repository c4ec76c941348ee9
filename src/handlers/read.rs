use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use super::Pipeline;
use crate::error::ApiError;
use crate::metrics::RequestTimer;
use crate::model::Object;
use crate::types::Operation;

/// GET /:id - show one object; no hooks apply
pub async fn read_object(
    State(pipeline): State<Pipeline>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Object>, ApiError> {
    let _timer = RequestTimer::start(Operation::Read.as_str());
    pipeline.read(&headers, &id).await.map(Json)
}

impl Pipeline {
    pub async fn read(&self, headers: &HeaderMap, id: &str) -> Result<Object, ApiError> {
        let identity = self.authenticator.user_id(headers).await?;
        let obj = self.fetch(id).await?;
        self.authorize(self.definitions.auth.read_policy(), &identity, &obj, Operation::Read.as_str())?;
        Ok(obj)
    }
}
