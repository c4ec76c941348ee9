//! Loading of the per-deployment definition documents: API shape,
//! authorization policies and custom logic hook references.

use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::DefinitionPaths;
use crate::model::{AllCustomLogic, ApiDefinition, Auth};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path} as JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not parse {path} as YAML: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Immutable per-process definitions handed to the pipeline at construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
    pub api: ApiDefinition,
    pub auth: Auth,
    pub custom_logic: AllCustomLogic,
}

impl Definitions {
    /// Load all three documents. The custom logic document may be absent,
    /// which leaves every operation without hooks.
    pub fn load(paths: &DefinitionPaths) -> Result<Self, ConfigError> {
        let api = load_file::<ApiDefinition>(&paths.api_path)?;
        let auth = load_file::<Auth>(&paths.auth_path)?;
        let custom_logic = match load_file::<AllCustomLogic>(&paths.custom_logic_path) {
            Ok(logic) => logic,
            Err(ConfigError::Io { source, path }) if source.kind() == ErrorKind::NotFound => {
                tracing::info!("No custom logic file at {}, hooks disabled", path.display());
                AllCustomLogic::default()
            }
            Err(e) => return Err(e),
        };

        Ok(Self { api, auth, custom_logic })
    }
}

/// Read a JSON document, or YAML when the extension says so.
pub fn load_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    if is_yaml {
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}
