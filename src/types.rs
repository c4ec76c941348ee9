/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operations exposed by the generated API.
///
/// Metrics and hook calls label Update by its action name rather than by
/// `update`, so `as_str` is only the fallback label for that variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    List,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::List => "list",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_labels_match_serde_names() {
        for op in [Operation::Create, Operation::Read, Operation::List, Operation::Update, Operation::Delete] {
            let json = serde_json::to_value(op).unwrap();
            assert_eq!(json.as_str(), Some(op.as_str()));
        }
    }
}
