pub mod definitions;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

pub use definitions::{ConfigError, Definitions};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub definitions: DefinitionPaths,
    pub custom_logic: CustomLogicConfig,
    pub identity: IdentityConfig,
    pub list: ListConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// Metrics namespace; empty means no prefix
    pub api_name: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub table_name: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionPaths {
    pub api_path: String,
    pub auth_path: String,
    pub custom_logic_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomLogicConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityMode {
    Parse,
    Jwt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub mode: IdentityMode,
    pub parse_url: String,
    pub parse_app_id: String,
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("API_NAME") {
            self.server.api_name = v;
        }
        if let Ok(v) = env::var("LOG_LEVEL") {
            self.server.log_level = v;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("TABLE_NAME") {
            self.database.table_name = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Definition file overrides
        if let Ok(v) = env::var("API_PATH") {
            self.definitions.api_path = v;
        }
        if let Ok(v) = env::var("AUTH_PATH") {
            self.definitions.auth_path = v;
        }
        if let Ok(v) = env::var("CUSTOM_LOGIC_PATH") {
            self.definitions.custom_logic_path = v;
        }

        // Custom logic overrides
        if let Ok(v) = env::var("CUSTOM_LOGIC_URL") {
            self.custom_logic.url = v;
        }
        if let Ok(v) = env::var("CUSTOM_LOGIC_TIMEOUT_SECS") {
            self.custom_logic.timeout_secs = v.parse().unwrap_or(self.custom_logic.timeout_secs);
        }

        // Identity overrides
        match env::var("AUTH_MODE").as_deref() {
            Ok("jwt") => self.identity.mode = IdentityMode::Jwt,
            Ok("parse") => self.identity.mode = IdentityMode::Parse,
            _ => {}
        }
        if let Ok(v) = env::var("PARSE_URL") {
            self.identity.parse_url = v;
        }
        if let Ok(v) = env::var("PARSE_APP_ID") {
            self.identity.parse_app_id = v;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.identity.jwt_secret = v;
        }

        // List overrides
        if let Ok(v) = env::var("DEFAULT_PAGE_SIZE") {
            self.list.default_page_size = v.parse().unwrap_or(self.list.default_page_size);
        }
        if let Ok(v) = env::var("MAX_PAGE_SIZE") {
            self.list.max_page_size = v.parse().unwrap_or(self.list.max_page_size);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 8080,
                api_name: String::new(),
                log_level: "widget_proxy=debug,tower_http=debug".to_string(),
            },
            database: DatabaseConfig {
                url: None,
                table_name: "objects".to_string(),
                max_connections: 10,
                connection_timeout: 30,
            },
            definitions: DefinitionPaths::default(),
            custom_logic: CustomLogicConfig {
                url: "http://custom-logic:8080/".to_string(),
                timeout_secs: 30,
            },
            identity: IdentityConfig::default(),
            list: ListConfig {
                default_page_size: 100,
                max_page_size: 1000,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 8080,
                api_name: String::new(),
                log_level: "widget_proxy=info,tower_http=info".to_string(),
            },
            database: DatabaseConfig {
                url: None,
                table_name: "objects".to_string(),
                max_connections: 50,
                connection_timeout: 5,
            },
            definitions: DefinitionPaths::default(),
            custom_logic: CustomLogicConfig {
                url: "http://custom-logic:8080/".to_string(),
                timeout_secs: 10,
            },
            identity: IdentityConfig::default(),
            list: ListConfig {
                default_page_size: 100,
                max_page_size: 500,
            },
        }
    }
}

impl Default for DefinitionPaths {
    fn default() -> Self {
        Self {
            api_path: "/app/api.json".to_string(),
            auth_path: "/app/auth.json".to_string(),
            custom_logic_path: "/app/customLogic.json".to_string(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            mode: IdentityMode::Parse,
            parse_url: "http://parse:1337/parse/".to_string(),
            parse_app_id: "appId".to_string(),
            jwt_secret: String::new(),
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self { default_page_size: 100, max_page_size: 1000 }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
