//! In-process document store.
//!
//! Used by tests and by `store.backend = "memory"`. A batch holds the write
//! lock while it checks and applies, so batches are serializable.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::{
    CommitOutcome, Document, DocumentData, DocumentStore, Query, WriteBatch, WriteFailure,
};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
struct Entry {
    /// Insertion sequence; ties in ordering fall back to it
    seq: u64,
    data: DocumentData,
}

type Collection = HashMap<String, Entry>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    sequence: AtomicU64,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every call fails until switched back
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Internal("document store unavailable".to_string()));
        }
        Ok(())
    }

    fn next_seq(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }

    fn matching(collection: Option<&Collection>, query: &Query) -> Vec<(u64, Document)> {
        let mut found: Vec<(u64, Document)> = collection
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(_, entry)| query.matches(&entry.data))
                    .map(|(id, entry)| (entry.seq, Document::new(id.clone(), entry.data.clone())))
                    .collect()
            })
            .unwrap_or_default();
        found.sort_by_key(|(seq, _)| *seq);
        found
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        self.ensure_available()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|entries| entries.get(id))
            .map(|entry| Document::new(id, entry.data.clone())))
    }

    async fn find(&self, collection: &str, query: &Query) -> AppResult<Vec<Document>> {
        self.ensure_available()?;
        let collections = self.collections.read().await;
        let mut documents: Vec<Document> = Self::matching(collections.get(collection), query)
            .into_iter()
            .map(|(_, doc)| doc)
            .collect();
        query.sort(&mut documents);
        Ok(documents)
    }

    async fn create(&self, collection: &str, id: &str, data: DocumentData) -> AppResult<()> {
        self.ensure_available()?;
        let mut collections = self.collections.write().await;
        let entries = collections.entry(collection.to_string()).or_default();
        if entries.contains_key(id) {
            return Err(AppError::Duplicate(format!("{}/{} already exists", collection, id)));
        }
        let seq = self.next_seq();
        entries.insert(id.to_string(), Entry { seq, data });
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: DocumentData) -> AppResult<()> {
        self.ensure_available()?;
        let mut collections = self.collections.write().await;
        let entry = collections
            .get_mut(collection)
            .and_then(|entries| entries.get_mut(id))
            .ok_or_else(|| AppError::NotFound(format!("{}/{} not found", collection, id)))?;
        for (k, v) in patch {
            entry.data.insert(k, v);
        }
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> AppResult<CommitOutcome> {
        self.ensure_available()?;
        let mut collections = self.collections.write().await;

        let mut failures = Vec::new();
        for write in &batch.writes {
            let current = collections
                .get(&write.collection)
                .and_then(|entries| entries.get(&write.id))
                .map(|entry| &entry.data);
            if let Some(reason) = write.check(current) {
                failures.push(WriteFailure {
                    collection: write.collection.clone(),
                    id: Some(write.id.clone()),
                    reason,
                });
            }
        }
        for guard in &batch.guards {
            let ids: BTreeSet<String> =
                Self::matching(collections.get(&guard.collection), &guard.query)
                    .into_iter()
                    .map(|(_, doc)| doc.id)
                    .collect();
            if let Some(failure) = guard.check(&ids) {
                failures.push(failure);
            }
        }
        if !failures.is_empty() {
            return Ok(CommitOutcome::Rejected(failures));
        }

        for write in &batch.writes {
            let entries = collections.entry(write.collection.clone()).or_default();
            let previous = entries.remove(&write.id);
            let seq = previous
                .as_ref()
                .map(|entry| entry.seq)
                .unwrap_or_else(|| self.next_seq());
            let data = write.apply(previous.map(|entry| entry.data));
            entries.insert(write.id.clone(), Entry { seq, data });
        }

        Ok(CommitOutcome::Committed)
    }

    async fn ping(&self) -> AppResult<()> {
        self.ensure_available()
    }
}
