//! Test doubles for the pipeline's collaborators

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::HeaderMap;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::auth::{Authenticator, IdentityError};
use crate::database::{Filter, Store, StoreError};
use crate::hooks::{CustomLogicExecutor, HookError, Phase};
use crate::model::{ApiDefinition, Object};

/// In-memory `Store` with the same allow-list rules as the Postgres adapter.
/// Every call is appended to a log so tests can assert what was (not) touched.
pub struct MemoryStore {
    api: ApiDefinition,
    objects: Mutex<Vec<Object>>,
    calls: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new(api: ApiDefinition) -> Self {
        Self {
            api,
            objects: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Insert directly, bypassing the call log.
    pub fn seed(&self, created_by: &str, fields: serde_json::Value) -> Object {
        let obj = Object {
            id: Some(Uuid::new_v4().to_string()),
            created_by: created_by.to_string(),
            created_at: Some(Utc::now()),
            fields: fields.as_object().cloned().unwrap_or_default(),
        };
        self.objects.lock().unwrap().push(obj.clone());
        obj
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stored(&self, id: &str) -> Option<Object> {
        self.objects.lock().unwrap().iter().find(|o| o.id.as_deref() == Some(id)).cloned()
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_object(&self, mut obj: Object) -> Result<Object, StoreError> {
        self.log("create");
        obj.id = Some(Uuid::new_v4().to_string());
        obj.created_at = Some(Utc::now());
        self.objects.lock().unwrap().push(obj.clone());
        Ok(obj)
    }

    async fn get_object(&self, id: &str) -> Result<Option<Object>, StoreError> {
        self.log("get");
        Ok(self.stored(id))
    }

    async fn list_objects(&self, page_size: i64, filter: Option<&Filter>) -> Result<Vec<Object>, StoreError> {
        self.log("list");
        if let Some(filter) = filter {
            if !self.api.is_filterable(&filter.field) {
                return Err(StoreError::InvalidFilter(filter.field.clone()));
            }
        }

        let objects = self.objects.lock().unwrap();
        // Insertion order is creation order; newest first
        Ok(objects
            .iter()
            .rev()
            .filter(|obj| match filter {
                None => true,
                // Mirrors `data ->> field`: JSON null is SQL NULL and never equal
                Some(f) => match obj.field(&f.field) {
                    Some(serde_json::Value::String(s)) => s == f.value,
                    Some(serde_json::Value::Null) | None => false,
                    Some(other) => other.to_string() == f.value,
                },
            })
            .take(page_size.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn update_object(&self, obj: Object, action: &str) -> Result<Object, StoreError> {
        self.log(format!("update:{}", action));
        let definition = self
            .api
            .action(action)
            .ok_or_else(|| StoreError::UnknownAction(action.to_string()))?;

        let id = obj.id.clone().unwrap_or_default();
        let mut objects = self.objects.lock().unwrap();
        let stored = objects
            .iter_mut()
            .find(|o| o.id.as_deref() == Some(id.as_str()))
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        stored.fields.extend(obj.restricted_to(&definition.fields));
        Ok(stored.clone())
    }

    async fn delete_object(&self, id: &str) -> Result<(), StoreError> {
        self.log("delete");
        let mut objects = self.objects.lock().unwrap();
        let before = objects.len();
        objects.retain(|o| o.id.as_deref() != Some(id));
        if objects.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

/// Always resolves to the same user; `None` rejects every request.
pub struct FixedAuthenticator(pub Option<String>);

impl FixedAuthenticator {
    pub fn user(id: &str) -> Self {
        Self(Some(id.to_string()))
    }
}

#[async_trait]
impl Authenticator for FixedAuthenticator {
    async fn user_id(&self, _headers: &HeaderMap) -> Result<String, IdentityError> {
        self.0.clone().ok_or(IdentityError::MissingCredential("authorization"))
    }
}

/// Executor that replays canned responses per (phase, operation) and records
/// every payload it was sent.
#[derive(Default)]
pub struct ScriptedExecutor {
    responses: Mutex<HashMap<(Phase, String), Result<Bytes, u16>>>,
    calls: Mutex<Vec<(Phase, String, Bytes)>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, phase: Phase, operation: &str, body: serde_json::Value) -> Self {
        let bytes = Bytes::from(serde_json::to_vec(&body).unwrap());
        self.responses.lock().unwrap().insert((phase, operation.to_string()), Ok(bytes));
        self
    }

    pub fn respond_raw(self, phase: Phase, operation: &str, body: &'static [u8]) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((phase, operation.to_string()), Ok(Bytes::from_static(body)));
        self
    }

    pub fn fail(self, phase: Phase, operation: &str, status: u16) -> Self {
        self.responses.lock().unwrap().insert((phase, operation.to_string()), Err(status));
        self
    }

    pub fn calls(&self) -> Vec<(Phase, String, Bytes)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CustomLogicExecutor for ScriptedExecutor {
    async fn execute(&self, payload: Bytes, phase: Phase, operation: &str) -> Result<Bytes, HookError> {
        self.calls.lock().unwrap().push((phase, operation.to_string(), payload.clone()));
        let scripted = self.responses.lock().unwrap().get(&(phase, operation.to_string())).cloned();
        match scripted {
            Some(Ok(body)) => Ok(body),
            Some(Err(status)) => Err(HookError::Status {
                url: format!("scripted://{}{}", phase, operation),
                status,
            }),
            // Unscripted hooks echo their input
            None => Ok(payload),
        }
    }
}
