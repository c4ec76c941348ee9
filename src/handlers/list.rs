use axum::{
    extract::{RawQuery, State},
    http::HeaderMap,
    Json,
};

use super::Pipeline;
use crate::auth::retain_authorized;
use crate::config::ListConfig;
use crate::database::Filter;
use crate::error::ApiError;
use crate::metrics::RequestTimer;
use crate::model::Object;
use crate::types::Operation;

const PAGE_SIZE_PARAM: &str = "pageSize";

/// Query parameters of a list request: an optional page size and at most one
/// equality filter. Whether the filter field is allowed is decided by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub page_size: i64,
    pub filter: Option<Filter>,
}

impl ListParams {
    pub fn parse(query: Option<&str>, limits: &ListConfig) -> Result<Self, ApiError> {
        let mut page_size = None;
        let mut filter: Option<Filter> = None;

        for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            if key == PAGE_SIZE_PARAM {
                // First occurrence wins
                if page_size.is_none() {
                    page_size = Some(parse_page_size(&value)?);
                }
                continue;
            }

            if let Some(existing) = &filter {
                if existing.field != key {
                    return Err(ApiError::bad_request(format!(
                        "only one filter is supported, got '{}' and '{}'",
                        existing.field, key
                    )));
                }
                continue;
            }
            filter = Some(Filter::new(key.into_owned(), value.into_owned()));
        }

        Ok(Self {
            page_size: page_size.unwrap_or(limits.default_page_size).min(limits.max_page_size),
            filter,
        })
    }
}

fn parse_page_size(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ApiError::bad_request(format!("{} must be a positive integer", PAGE_SIZE_PARAM))),
    }
}

/// GET / - list visible objects, newest first
pub async fn list_objects(
    State(pipeline): State<Pipeline>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Json<Vec<Object>>, ApiError> {
    let _timer = RequestTimer::start(Operation::List.as_str());
    pipeline.list(&headers, query.as_deref()).await.map(Json)
}

impl Pipeline {
    pub async fn list(&self, headers: &HeaderMap, query: Option<&str>) -> Result<Vec<Object>, ApiError> {
        let identity = self.authenticator.user_id(headers).await?;
        let params = ListParams::parse(query, &self.list)?;

        let candidates = self.store.list_objects(params.page_size, params.filter.as_ref()).await?;
        let total = candidates.len();
        let visible = retain_authorized(self.definitions.auth.list_policy(), &identity, candidates);
        tracing::debug!("List returned {} of {} candidates for {}", visible.len(), total, identity);

        Ok(visible)
    }
}
