use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shape of the generated API: which fields may be filtered on when listing,
/// and which named update actions exist with the fields each may write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiDefinition {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub operations: Option<OperationDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationDefinition {
    #[serde(default)]
    pub list: Option<ListDefinition>,
    #[serde(default)]
    pub update: Option<UpdateDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListDefinition {
    /// Fields eligible for a single equality filter
    #[serde(default)]
    pub filter: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateDefinition {
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl ApiDefinition {
    pub fn action(&self, name: &str) -> Option<&ActionDefinition> {
        self.operations
            .as_ref()
            .and_then(|ops| ops.update.as_ref())
            .and_then(|update| update.actions.iter().find(|a| a.name == name))
    }

    pub fn filter_fields(&self) -> &[String] {
        self.operations
            .as_ref()
            .and_then(|ops| ops.list.as_ref())
            .map(|list| list.filter.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_filterable(&self, field: &str) -> bool {
        self.filter_fields().iter().any(|f| f == field)
    }
}

/// Authorization policy per access mode. Update carries one policy per action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Auth {
    #[serde(default, rename = "apiID")]
    pub api_id: String,
    #[serde(default)]
    pub read: Option<AuthPolicy>,
    /// List filtering; falls back to the read policy when not set
    #[serde(default)]
    pub list: Option<AuthPolicy>,
    #[serde(default)]
    pub update: HashMap<String, AuthPolicy>,
    #[serde(default)]
    pub delete: Option<AuthPolicy>,
}

impl Auth {
    pub fn read_policy(&self) -> Option<&AuthPolicy> {
        self.read.as_ref()
    }

    pub fn list_policy(&self) -> Option<&AuthPolicy> {
        self.list.as_ref().or(self.read.as_ref())
    }

    pub fn update_policy(&self, action: &str) -> Option<&AuthPolicy> {
        self.update.get(action)
    }

    pub fn delete_policy(&self) -> Option<&AuthPolicy> {
        self.delete.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPolicy {
    #[serde(rename = "type")]
    pub policy_type: AuthPolicyType,
    #[serde(default)]
    pub user_attribute: Option<String>,
    #[serde(default)]
    pub object_attribute: Option<String>,
}

impl AuthPolicy {
    pub fn created_by() -> Self {
        Self { policy_type: AuthPolicyType::CreatedBy, user_attribute: None, object_attribute: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthPolicyType {
    CreatedBy,
    AttributeMatch,
    Custom,
}

/// Hook references for one operation. A missing reference is a pass-through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomLogic {
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
}

impl CustomLogic {
    pub fn has_before(&self) -> bool {
        self.before.is_some()
    }

    pub fn has_after(&self) -> bool {
        self.after.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllCustomLogic {
    #[serde(default, rename = "apiID")]
    pub api_id: String,
    #[serde(default)]
    pub create: Option<CustomLogic>,
    #[serde(default)]
    pub update: HashMap<String, CustomLogic>,
    #[serde(default)]
    pub delete: Option<CustomLogic>,
}

impl AllCustomLogic {
    pub fn for_create(&self) -> Option<&CustomLogic> {
        self.create.as_ref()
    }

    pub fn for_action(&self, action: &str) -> Option<&CustomLogic> {
        self.update.get(action)
    }

    pub fn for_delete(&self) -> Option<&CustomLogic> {
        self.delete.as_ref()
    }
}
