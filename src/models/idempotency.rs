//! Idempotency records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;
use crate::error::AppError;

/// Marks a client key as used. Stored in the `idempotency_keys` collection
/// under `<operation>:<officer_id>:<key>` in the same batch as the write it
/// protects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    pub id: String,
    pub operation: String,
    /// Officer who submitted the request
    pub officer_id: String,
    /// Canonical form of the request the key was first used with
    pub fingerprint: String,
    /// Id of the assignment or handover the key produced
    pub resource_id: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// A client key as submitted by one officer for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyKey {
    pub operation: &'static str,
    pub officer_id: String,
    pub key: String,
    pub fingerprint: String,
}

impl IdempotencyKey {
    /// `fingerprint` lists the request fields that must match on resubmission
    pub fn new(operation: &'static str, officer_id: &str, key: &str, fingerprint: serde_json::Value) -> Self {
        Self {
            operation,
            officer_id: officer_id.to_string(),
            key: key.to_string(),
            fingerprint: fingerprint.to_string(),
        }
    }

    pub fn document_id(&self) -> String {
        format!("{}:{}:{}", self.operation, self.officer_id, self.key)
    }

    /// A stored record may only be replayed for the same request
    pub fn check(&self, record: &IdempotencyRecord) -> Result<(), AppError> {
        if record.fingerprint == self.fingerprint {
            Ok(())
        } else {
            Err(AppError::Conflict(format!(
                "Idempotency key {} was already used for a different request",
                self.key
            )))
        }
    }

    pub fn record(&self, resource_id: &str, now: DateTime<Utc>) -> IdempotencyRecord {
        IdempotencyRecord {
            id: self.document_id(),
            operation: self.operation.to_string(),
            officer_id: self.officer_id.clone(),
            fingerprint: self.fingerprint.clone(),
            resource_id: resource_id.to_string(),
            created_at: now,
        }
    }
}
