//! Authorization decisions. Pure functions of (policy, identity, object) so
//! that list results can be narrowed without further I/O.

use crate::model::{AuthPolicy, AuthPolicyType, Object};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

/// Decide whether `identity` may access `object` under `policy`.
///
/// A missing policy denies. `AttributeMatch` and `Custom` are accepted in
/// definitions but not evaluated here, so they deny as well.
pub fn evaluate(policy: Option<&AuthPolicy>, identity: &str, object: &Object) -> Decision {
    let Some(policy) = policy else {
        return Decision::Deny;
    };

    match policy.policy_type {
        AuthPolicyType::CreatedBy if !identity.is_empty() && identity == object.created_by => Decision::Allow,
        AuthPolicyType::CreatedBy | AuthPolicyType::AttributeMatch | AuthPolicyType::Custom => Decision::Deny,
    }
}

/// Keep the objects `identity` may see, preserving order.
pub fn retain_authorized(policy: Option<&AuthPolicy>, identity: &str, mut objects: Vec<Object>) -> Vec<Object> {
    objects.retain(|obj| evaluate(policy, identity, obj).is_allowed());
    objects
}
