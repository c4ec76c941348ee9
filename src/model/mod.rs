pub mod definition;
pub mod object;

pub use definition::{
    ActionDefinition, AllCustomLogic, ApiDefinition, Auth, AuthPolicy, AuthPolicyType, CustomLogic,
    ListDefinition, OperationDefinition, UpdateDefinition,
};
pub use object::{Object, SYSTEM_FIELDS};
