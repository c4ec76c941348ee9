use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::store::StoreError;

/// Connection pool setup and identifier hygiene for the relational store
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open the pool. Connections are checked out per statement and returned
    /// on drop, so no request holds one across a custom logic call.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Quote SQL identifier to prevent injection
    pub fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Table names are interpolated into DDL, so only plain identifiers
    /// (`[a-zA-Z_][a-zA-Z0-9_]*`, at most 63 bytes) are accepted.
    pub fn is_valid_table_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_table_names() {
        assert!(DatabaseManager::is_valid_table_name("objects"));
        assert!(DatabaseManager::is_valid_table_name("_w123abc_DEF"));
        assert!(!DatabaseManager::is_valid_table_name("1objects"));
        assert!(!DatabaseManager::is_valid_table_name("tenant-123"));
        assert!(!DatabaseManager::is_valid_table_name("objects; DROP TABLE users"));
        assert!(!DatabaseManager::is_valid_table_name(""));
        assert!(!DatabaseManager::is_valid_table_name(&"a".repeat(64)));
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(DatabaseManager::quote_identifier("objects"), "\"objects\"");
        assert_eq!(DatabaseManager::quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[tokio::test]
    async fn connect_requires_database_url() {
        let config = DatabaseConfig {
            url: None,
            table_name: "objects".to_string(),
            max_connections: 1,
            connection_timeout: 1,
        };
        let err = DatabaseManager::connect(&config).await.unwrap_err();
        assert!(matches!(err, StoreError::ConfigMissing("DATABASE_URL")));
    }
}
