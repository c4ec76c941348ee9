use async_trait::async_trait;
use thiserror::Error;

use crate::model::Object;

/// Errors from a `Store` implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Field is not filterable: {0}")]
    InvalidFilter(String),

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Single equality predicate applied to a list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

impl Filter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self { field: field.into(), value: value.into() }
    }
}

/// Persistence port for tenant objects.
///
/// `get_object` reports a missing identifier as `Ok(None)`; callers decide
/// whether that is a 404. `update_object` writes only the fields the named
/// action allows, and `list_objects` only accepts allow-listed filter fields.
#[async_trait]
pub trait Store: Send + Sync {
    /// Idempotent; safe to run on every start.
    async fn create_schema(&self) -> Result<(), StoreError>;

    /// Persist a new object. Identifier and creation time are assigned here.
    async fn create_object(&self, obj: Object) -> Result<Object, StoreError>;

    async fn get_object(&self, id: &str) -> Result<Option<Object>, StoreError>;

    /// Newest first, at most `page_size` objects.
    async fn list_objects(&self, page_size: i64, filter: Option<&Filter>) -> Result<Vec<Object>, StoreError>;

    async fn update_object(&self, obj: Object, action: &str) -> Result<Object, StoreError>;

    async fn delete_object(&self, id: &str) -> Result<(), StoreError>;

    /// Cheap connectivity probe for health checks.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
