//! PostgreSQL document store.
//!
//! All collections share the `documents` table (see `migrations/`). Equality
//! filters use JSONB containment; ordering compares the text form of a field
//! in the C collation, which is chronological for stored timestamps.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{Pool, Postgres, Row};

use super::store::{
    CommitOutcome, Direction, Document, DocumentData, DocumentStore, Query, WriteBatch,
    WriteFailure, WriteOp,
};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn try_commit(&self, batch: &WriteBatch) -> Result<CommitOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        let mut failures = Vec::new();
        for write in &batch.writes {
            let current: Option<Value> = sqlx::query_scalar(
                "SELECT data FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
            )
            .bind(&write.collection)
            .bind(&write.id)
            .fetch_optional(&mut *tx)
            .await?;
            let current = current.and_then(into_object);
            if let Some(reason) = write.check(current.as_ref()) {
                failures.push(WriteFailure {
                    collection: write.collection.clone(),
                    id: Some(write.id.clone()),
                    reason,
                });
            }
        }

        for guard in &batch.guards {
            let ids: Vec<String> = sqlx::query_scalar(
                "SELECT id FROM documents WHERE collection = $1 AND data @> $2",
            )
            .bind(&guard.collection)
            .bind(guard.query.filter_object())
            .fetch_all(&mut *tx)
            .await?;
            let ids: BTreeSet<String> = ids.into_iter().collect();
            if let Some(failure) = guard.check(&ids) {
                failures.push(failure);
            }
        }

        if !failures.is_empty() {
            tx.rollback().await?;
            return Ok(CommitOutcome::Rejected(failures));
        }

        for write in &batch.writes {
            match &write.op {
                WriteOp::Create(data) => {
                    sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
                        .bind(&write.collection)
                        .bind(&write.id)
                        .bind(Value::Object(data.clone()))
                        .execute(&mut *tx)
                        .await?;
                }
                WriteOp::Update(patch) => {
                    sqlx::query(
                        "UPDATE documents SET data = data || $3 WHERE collection = $1 AND id = $2",
                    )
                    .bind(&write.collection)
                    .bind(&write.id)
                    .bind(Value::Object(patch.clone()))
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(CommitOutcome::Committed)
    }
}

fn into_object(value: Value) -> Option<DocumentData> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Serialization failures, deadlocks and unique violations are worth a retry
fn is_conflict(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => matches!(
            db.code().as_deref(),
            Some("40001") | Some("40P01") | Some("23505")
        ),
        _ => false,
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        let data: Option<Value> =
            sqlx::query_scalar("SELECT data FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(data
            .and_then(into_object)
            .map(|data| Document::new(id, data)))
    }

    async fn find(&self, collection: &str, query: &Query) -> AppResult<Vec<Document>> {
        let mut sql =
            String::from("SELECT id, data FROM documents WHERE collection = $1 AND data @> $2");
        if let Some(order) = &query.order_by {
            let direction = match order.direction {
                Direction::Ascending => "ASC",
                Direction::Descending => "DESC",
            };
            sql.push_str(&format!(
                " ORDER BY data ->> $3 COLLATE \"C\" {}, created_at {}",
                direction, direction
            ));
        } else {
            sql.push_str(" ORDER BY created_at");
        }

        let mut builder = sqlx::query(&sql)
            .bind(collection)
            .bind(query.filter_object());
        if let Some(order) = &query.order_by {
            builder = builder.bind(&order.field);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id")?;
            let data: Value = row.try_get("data")?;
            if let Some(data) = into_object(data) {
                documents.push(Document::new(id, data));
            }
        }
        Ok(documents)
    }

    async fn create(&self, collection: &str, id: &str, data: DocumentData) -> AppResult<()> {
        let result = sqlx::query(
            "INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
        )
        .bind(collection)
        .bind(id)
        .bind(Value::Object(data))
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::Duplicate(format!("{}/{} already exists", collection, id)));
        }
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: DocumentData) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE documents SET data = data || $3 WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Value::Object(patch))
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{}/{} not found", collection, id)));
        }
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> AppResult<CommitOutcome> {
        match self.try_commit(&batch).await {
            Ok(outcome) => Ok(outcome),
            Err(e) if is_conflict(&e) => {
                tracing::debug!("Batch conflicted with a concurrent transaction: {}", e);
                Ok(CommitOutcome::Conflict)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
