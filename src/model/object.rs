use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields owned by the persistence layer. They are never taken from client
/// input or hook output, and never written by an update action.
pub const SYSTEM_FIELDS: &[&str] = &["id", "createdBy", "createdAt"];

/// A tenant record: server-assigned identity plus the tenant-defined fields.
///
/// Serialized flat, so `{"id": .., "createdBy": .., "createdAt": .., "name": ..}`
/// round-trips with `name` landing in `fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Object {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Object {
    /// Decode a request or hook payload. Only JSON objects are accepted.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Look up a field by its wire name, system fields included.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => self.id.clone().map(Value::String),
            "createdBy" => Some(Value::String(self.created_by.clone())),
            "createdAt" => self.created_at.map(|t| Value::String(t.to_rfc3339())),
            other => self.fields.get(other).cloned(),
        }
    }

    /// The subset of tenant fields named in `allowed`, skipping system fields
    /// and names the payload does not carry.
    pub fn restricted_to(&self, allowed: &[String]) -> Map<String, Value> {
        allowed
            .iter()
            .filter(|name| !SYSTEM_FIELDS.contains(&name.as_str()))
            .filter_map(|name| self.fields.get(name).map(|v| (name.clone(), v.clone())))
            .collect()
    }
}
