//! Repository layer over the document store

pub mod assignments;
pub mod equipment;
pub mod handovers;
pub mod idempotency;
pub mod memory;
pub mod officers;
pub mod postgres;
pub mod store;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

use crate::error::AppResult;

pub use store::{
    CommitOutcome, Direction, Document, DocumentData, DocumentStore, Query, Write, WriteBatch,
    WriteFailure,
};

/// Collection names
pub mod collections {
    pub const OFFICERS: &str = "officers";
    /// Uniqueness markers keyed by lowercase email
    pub const OFFICER_EMAILS: &str = "officer_emails";
    /// Uniqueness markers keyed by badge number
    pub const OFFICER_BADGES: &str = "officer_badges";
    pub const EQUIPMENT: &str = "equipment";
    pub const ASSIGNMENTS: &str = "assignments";
    pub const HANDOVERS: &str = "handovers";
    pub const IDEMPOTENCY_KEYS: &str = "idempotency_keys";
}

/// Main repository struct holding the document store
#[derive(Clone)]
pub struct Repository {
    pub store: Arc<dyn DocumentStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Repository backed by PostgreSQL
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self::new(Arc::new(postgres::PgStore::new(pool)))
    }

    /// Repository backed by an empty in-process store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(memory::MemoryStore::new()))
    }

    /// Generic lookup: every document in `collection` matching `query`
    pub async fn lookup(&self, collection: &str, query: &Query) -> AppResult<Vec<Document>> {
        self.store.find(collection, query).await
    }

    /// Lookup decoded into a model
    pub async fn lookup_as<T: serde::de::DeserializeOwned>(
        &self,
        collection: &str,
        query: &Query,
    ) -> AppResult<Vec<T>> {
        self.store
            .find(collection, query)
            .await?
            .into_iter()
            .map(Document::decode::<T>)
            .collect()
    }

    /// Single document decoded into a model
    pub async fn fetch_as<T: serde::de::DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> AppResult<Option<T>> {
        self.store
            .get(collection, id)
            .await?
            .map(Document::decode::<T>)
            .transpose()
    }
}

/// Fresh storage id
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
