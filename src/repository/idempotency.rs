//! Idempotency key bookkeeping

use chrono::{DateTime, Utc};

use super::{collections, store::encode, Repository, Write};
use crate::{
    error::AppResult,
    models::idempotency::{IdempotencyKey, IdempotencyRecord},
};

impl Repository {
    /// Record left by an earlier submission of the same key by the same officer
    pub async fn idempotency_get(&self, key: &IdempotencyKey) -> AppResult<Option<IdempotencyRecord>> {
        self.fetch_as(collections::IDEMPOTENCY_KEYS, &key.document_id())
            .await
    }

    /// Write claiming a key; rejected if another submission claimed it first
    pub fn idempotency_claim(
        key: &IdempotencyKey,
        resource_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Write> {
        let record = key.record(resource_id, now);
        Ok(Write::create(
            collections::IDEMPOTENCY_KEYS,
            &record.id,
            encode(&record)?,
        ))
    }
}
