use async_trait::async_trait;
use std::future::Future;
use std::time::Instant;

use crate::database::store::{Filter, Store, StoreError};
use crate::metrics;
use crate::model::Object;
use crate::types::Operation;

/// Wraps any `Store`, recording per-operation latency and error counts.
/// Results pass through untouched.
pub struct InstrumentedStore<S> {
    inner: S,
}

impl<S: Store> InstrumentedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

async fn observed<T, F>(label: &str, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    let start = Instant::now();
    let result = call.await;
    metrics::observe_database(label, start.elapsed());
    if let Err(e) = &result {
        metrics::record_database_error(label);
        tracing::debug!("Store call {} failed: {}", label, e);
    }
    result
}

#[async_trait]
impl<S: Store> Store for InstrumentedStore<S> {
    async fn create_schema(&self) -> Result<(), StoreError> {
        self.inner.create_schema().await
    }

    async fn create_object(&self, obj: Object) -> Result<Object, StoreError> {
        observed(Operation::Create.as_str(), self.inner.create_object(obj)).await
    }

    async fn get_object(&self, id: &str) -> Result<Option<Object>, StoreError> {
        observed(Operation::Read.as_str(), self.inner.get_object(id)).await
    }

    async fn list_objects(&self, page_size: i64, filter: Option<&Filter>) -> Result<Vec<Object>, StoreError> {
        observed(Operation::List.as_str(), self.inner.list_objects(page_size, filter)).await
    }

    async fn update_object(&self, obj: Object, action: &str) -> Result<Object, StoreError> {
        observed(action, self.inner.update_object(obj, action)).await
    }

    async fn delete_object(&self, id: &str) -> Result<(), StoreError> {
        observed(Operation::Delete.as_str(), self.inner.delete_object(id)).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}
