use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{types::Json, FromRow, PgPool};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::store::{Filter, Store, StoreError};
use crate::model::{ApiDefinition, Object};

const COLUMNS: &str = "id, created_by, created_at, data";

/// Postgres-backed store. Tenant fields live in a JSONB column next to the
/// server-owned id, owner and creation time.
pub struct PgStore {
    pool: PgPool,
    table_name: String,
    api: Arc<ApiDefinition>,
}

#[derive(Debug, FromRow)]
struct ObjectRow {
    id: Uuid,
    created_by: String,
    created_at: DateTime<Utc>,
    data: Json<Map<String, Value>>,
}

impl From<ObjectRow> for Object {
    fn from(row: ObjectRow) -> Self {
        Object {
            id: Some(row.id.to_string()),
            created_by: row.created_by,
            created_at: Some(row.created_at),
            fields: row.data.0,
        }
    }
}

impl PgStore {
    pub fn new(pool: PgPool, table_name: &str, api: Arc<ApiDefinition>) -> Result<Self, StoreError> {
        if !DatabaseManager::is_valid_table_name(table_name) {
            return Err(StoreError::InvalidTableName(table_name.to_string()));
        }
        Ok(Self {
            pool,
            table_name: table_name.to_string(),
            api,
        })
    }

    fn table(&self) -> String {
        DatabaseManager::quote_identifier(&self.table_name)
    }

    /// WHERE fragment for an allow-listed filter field. `$1` is the value;
    /// JSONB fields also take the field name as `$3`.
    fn filter_condition(field: &str) -> (&'static str, bool) {
        match field {
            "id" => ("id::text = $1", false),
            "createdBy" => ("created_by = $1", false),
            "createdAt" => ("created_at::text = $1", false),
            _ => ("data ->> $3 = $1", true),
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_schema(&self) -> Result<(), StoreError> {
        let create_table = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                created_by TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                data JSONB NOT NULL DEFAULT '{{}}'::jsonb
            )",
            self.table()
        );
        sqlx::query(&create_table).execute(&self.pool).await?;

        let create_index = format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} (created_at DESC)",
            DatabaseManager::quote_identifier(&format!("{}_created_at_idx", self.table_name)),
            self.table()
        );
        sqlx::query(&create_index).execute(&self.pool).await?;

        tracing::info!("Schema ready for table {}", self.table_name);
        Ok(())
    }

    async fn create_object(&self, obj: Object) -> Result<Object, StoreError> {
        let sql = format!(
            "INSERT INTO {} (created_by, data) VALUES ($1, $2) RETURNING {}",
            self.table(),
            COLUMNS
        );
        let row = sqlx::query_as::<_, ObjectRow>(&sql)
            .bind(&obj.created_by)
            .bind(Json(&obj.fields))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn get_object(&self, id: &str) -> Result<Option<Object>, StoreError> {
        // Anything that is not a UUID cannot name a row
        let Ok(uuid) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let sql = format!("SELECT {} FROM {} WHERE id = $1", COLUMNS, self.table());
        match sqlx::query_as::<_, ObjectRow>(&sql)
            .bind(uuid)
            .fetch_one(&self.pool)
            .await
        {
            Ok(row) => Ok(Some(row.into())),
            Err(sqlx::Error::RowNotFound) => Ok(None),
            Err(other) => Err(other.into()),
        }
    }

    async fn list_objects(&self, page_size: i64, filter: Option<&Filter>) -> Result<Vec<Object>, StoreError> {
        let rows = match filter {
            None => {
                let sql = format!(
                    "SELECT {} FROM {} ORDER BY created_at DESC LIMIT $1",
                    COLUMNS,
                    self.table()
                );
                sqlx::query_as::<_, ObjectRow>(&sql)
                    .bind(page_size)
                    .fetch_all(&self.pool)
                    .await?
            }
            Some(filter) => {
                if !self.api.is_filterable(&filter.field) {
                    return Err(StoreError::InvalidFilter(filter.field.clone()));
                }
                let (condition, binds_field) = Self::filter_condition(&filter.field);
                let sql = format!(
                    "SELECT {} FROM {} WHERE {} ORDER BY created_at DESC LIMIT $2",
                    COLUMNS,
                    self.table(),
                    condition
                );
                let mut query = sqlx::query_as::<_, ObjectRow>(&sql)
                    .bind(&filter.value)
                    .bind(page_size);
                if binds_field {
                    query = query.bind(&filter.field);
                }
                query.fetch_all(&self.pool).await?
            }
        };

        Ok(rows.into_iter().map(Object::from).collect())
    }

    async fn update_object(&self, obj: Object, action: &str) -> Result<Object, StoreError> {
        let definition = self
            .api
            .action(action)
            .ok_or_else(|| StoreError::UnknownAction(action.to_string()))?;

        let id = obj.id.clone().unwrap_or_default();
        let uuid = Uuid::parse_str(&id).map_err(|_| StoreError::NotFound(id.clone()))?;
        let patch = obj.restricted_to(&definition.fields);

        let sql = format!(
            "UPDATE {} SET data = data || $2 WHERE id = $1 RETURNING {}",
            self.table(),
            COLUMNS
        );
        let row = sqlx::query_as::<_, ObjectRow>(&sql)
            .bind(uuid)
            .bind(Json(&patch))
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        Ok(row.into())
    }

    async fn delete_object(&self, id: &str) -> Result<(), StoreError> {
        let uuid = Uuid::parse_str(id).map_err(|_| StoreError::NotFound(id.to_string()))?;

        let sql = format!("DELETE FROM {} WHERE id = $1", self.table());
        let result = sqlx::query(&sql).bind(uuid).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
