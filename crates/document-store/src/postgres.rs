use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Document, DocumentId, DocumentQuery, DocumentStoreError, Result, Version,
    store::{DocumentStore, PutOptions, validate_collection, validate_query},
};

/// PostgreSQL-backed document store implementation.
///
/// Bodies live in a single JSONB `documents` table keyed by
/// `(collection, id)`.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Creates a new PostgreSQL document store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_document(row: PgRow) -> Result<Document> {
        Ok(Document {
            id: DocumentId::from_uuid(row.try_get::<Uuid, _>("id")?),
            collection: row.try_get("collection")?,
            version: Version::new(row.try_get("version")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            body: row.try_get("body")?,
        })
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn put(
        &self,
        collection: &str,
        id: DocumentId,
        body: serde_json::Value,
        options: PutOptions,
    ) -> Result<Version> {
        validate_collection(collection)?;

        let mut tx = self.pool.begin().await?;

        let current: Option<i64> = sqlx::query_scalar(
            "SELECT version FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(collection)
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let current_version = current.map(Version::new).unwrap_or(Version::initial());

        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            return Err(DocumentStoreError::ConcurrencyConflict {
                collection: collection.to_string(),
                id,
                expected,
                actual: current_version,
            });
        }

        let new_version = current_version.next();
        let now = Utc::now();

        if current.is_some() {
            sqlx::query(
                r#"
                UPDATE documents
                SET version = $3, updated_at = $4, body = $5
                WHERE collection = $1 AND id = $2
                "#,
            )
            .bind(collection)
            .bind(id.as_uuid())
            .bind(new_version.as_i64())
            .bind(now)
            .bind(&body)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(
                r#"
                INSERT INTO documents (collection, id, version, created_at, updated_at, body)
                VALUES ($1, $2, $3, $4, $4, $5)
                "#,
            )
            .bind(collection)
            .bind(id.as_uuid())
            .bind(new_version.as_i64())
            .bind(now)
            .bind(&body)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                // Another writer inserted the same key first
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.constraint() == Some("documents_pkey")
                {
                    return DocumentStoreError::ConcurrencyConflict {
                        collection: collection.to_string(),
                        id,
                        expected: options.expected_version.unwrap_or(Version::initial()),
                        actual: Version::first(),
                    };
                }
                DocumentStoreError::Database(e)
            })?;
        }

        tx.commit().await?;

        metrics::counter!("document_store_writes_total", "collection" => collection.to_string())
            .increment(1);
        tracing::debug!(%collection, %id, version = %new_version, "document stored");

        Ok(new_version)
    }

    async fn get(&self, collection: &str, id: DocumentId) -> Result<Option<Document>> {
        validate_collection(collection)?;

        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT collection, id, version, created_at, updated_at, body
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_document).transpose()
    }

    async fn delete(&self, collection: &str, id: DocumentId) -> Result<bool> {
        validate_collection(collection)?;

        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn query(&self, query: DocumentQuery) -> Result<Vec<Document>> {
        validate_query(&query)?;

        let mut sql = String::from(
            "SELECT collection, id, version, created_at, updated_at, body FROM documents WHERE collection = $1",
        );
        let mut param_count = 1;

        // Build dynamic query
        for filter in &query.filters {
            param_count += 1;
            let field_param = param_count;
            if filter.value.is_null() {
                sql.push_str(&format!(
                    " AND (body -> ${field_param} IS NULL OR body -> ${field_param} = 'null'::jsonb)"
                ));
            } else {
                param_count += 1;
                sql.push_str(&format!(" AND body -> ${field_param} = ${param_count}"));
            }
        }

        sql.push_str(" ORDER BY seq ASC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        // Bind parameters in the order they were numbered
        let mut sqlx_query = sqlx::query(&sql).bind(&query.collection);

        for filter in &query.filters {
            sqlx_query = sqlx_query.bind(&filter.field);
            if !filter.value.is_null() {
                sqlx_query = sqlx_query.bind(&filter.value);
            }
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_document).collect()
    }
}
