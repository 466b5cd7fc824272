use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgArguments, postgres::PgPoolOptions, PgPool, Row};
use tracing::info;

use super::{check_collection, check_document, new_document_id, Document, DocumentData, DocumentStore, StoreError, WriteAck};
use crate::config::DatabaseConfig;
use crate::filter::{DocumentQuery, FilterOrder, FilterWhere, SqlParam, SqlResult};

const CREATE_DOCUMENTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        data JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (collection, id)
    )
"#;

/// Document store backed by a single JSONB table in Postgres
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Connects using DATABASE_URL settings and creates the documents table if needed
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Backend("DATABASE_URL is not configured".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Connected document store pool (max {} connections)", config.max_connections);

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_DOCUMENTS_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed document store pool");
    }

    fn select_sql(collection: &str, query: &DocumentQuery) -> Result<SqlResult, StoreError> {
        query.validate()?;

        let mut params = vec![SqlParam::Text(collection.to_string())];
        let mut sql = "SELECT id, data FROM documents WHERE collection = $1".to_string();

        let (where_clause, where_params) = FilterWhere::generate(&query.conditions, params.len())?;
        if !where_clause.is_empty() {
            sql.push_str(" AND ");
            sql.push_str(&where_clause);
        }
        params.extend(where_params);

        let (order_clause, order_params) = FilterOrder::generate(&query.order, params.len())?;
        if order_clause.is_empty() {
            sql.push_str(" ORDER BY created_at ASC");
        } else {
            sql.push(' ');
            sql.push_str(&order_clause);
            sql.push_str(", created_at ASC");
        }
        params.extend(order_params);

        Ok(SqlResult { query: sql, params })
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn add(&self, collection: &str, data: DocumentData) -> Result<String, StoreError> {
        check_collection(collection)?;
        let id = new_document_id();
        sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(&id)
            .bind(Value::Object(data))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        check_document(collection, id)?;
        let row = sqlx::query("SELECT data FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let data: Value = row.try_get("data")?;
                Ok(Some(Document { id: id.to_string(), data: into_object(id, data)? }))
            }
            None => Ok(None),
        }
    }

    async fn update(&self, collection: &str, id: &str, data: DocumentData) -> Result<WriteAck, StoreError> {
        check_document(collection, id)?;
        sqlx::query(
            "UPDATE documents SET data = data || $3, updated_at = now() WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Value::Object(data))
        .execute(&self.pool)
        .await?;
        Ok(WriteAck::now())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<WriteAck, StoreError> {
        check_document(collection, id)?;
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(WriteAck::now())
    }

    async fn query(&self, collection: &str, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
        check_collection(collection)?;
        let sql_result = Self::select_sql(collection, query)?;

        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param(q, p);
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| -> Result<Document, StoreError> {
                let id: String = row.try_get("id")?;
                let data: Value = row.try_get("data")?;
                let data = into_object(&id, data)?;
                Ok(Document { id, data })
            })
            .collect()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn into_object(id: &str, data: Value) -> Result<DocumentData, StoreError> {
    match data {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::MalformedDocument(id.to_string())),
    }
}

fn bind_param<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    p: &'q SqlParam,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match p {
        SqlParam::Text(s) => q.bind(s.as_str()),
        // JSONB
        SqlParam::Json(v) => q.bind(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SortDirection;

    #[test]
    fn builds_filtered_ordered_select() {
        let query = DocumentQuery::new()
            .where_eq("status", "Inbox")
            .where_eq("office", "NY")
            .order_by("createdAt", SortDirection::Asc);
        let sql = PgDocumentStore::select_sql("candidates", &query).unwrap();
        assert_eq!(
            sql.query,
            "SELECT id, data FROM documents WHERE collection = $1 AND data -> $2 = $3 AND data -> $4 = $5 \
             ORDER BY data ->> $6 ASC, created_at ASC"
        );
        assert_eq!(sql.params.len(), 6);
        assert_eq!(sql.params[0], SqlParam::Text("candidates".into()));
    }

    #[test]
    fn plain_select_orders_by_insert_time() {
        let sql = PgDocumentStore::select_sql("postings", &DocumentQuery::new()).unwrap();
        assert_eq!(
            sql.query,
            "SELECT id, data FROM documents WHERE collection = $1 ORDER BY created_at ASC"
        );
    }

    #[test]
    fn rejects_unsafe_field_names() {
        let query = DocumentQuery::new().where_eq("status') OR 1=1 --", "x");
        assert!(matches!(
            PgDocumentStore::select_sql("candidates", &query),
            Err(StoreError::Filter(_))
        ));
    }
}
