//! Asset assignment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::enums::RecordStatus;
use super::officer::OfficerShort;
use super::timestamp;

/// Assignment document as stored in the `assignments` collection.
///
/// `asset_name` and `officer_name` are copies taken from the submitted form
/// and are never refreshed, so history keeps the names as they were.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Assignment {
    pub id: String,
    pub asset_id: String,
    pub asset_name: String,
    pub officer_id: String,
    pub officer_name: String,
    /// Officer who performed the assignment
    pub assigned_by: Option<String>,
    #[serde(with = "timestamp")]
    pub assigned_date: DateTime<Utc>,
    #[serde(with = "timestamp::option")]
    pub returned_date: Option<DateTime<Utc>>,
    pub status: RecordStatus,
}

impl Assignment {
    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }
}

/// Assign asset request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateAssignment {
    #[validate(custom(function = "crate::validation::non_blank", message = "Asset ID is required"))]
    pub asset_id: String,
    #[serde(default)]
    pub asset_name: String,
    #[validate(custom(function = "crate::validation::non_blank", message = "Officer is required"))]
    pub officer_id: String,
    #[serde(default)]
    pub officer_name: String,
    /// Client token making resubmission safe
    pub idempotency_key: Option<String>,
}

/// History row: the stored assignment plus the officer's current profile
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssignmentHistoryEntry {
    #[serde(flatten)]
    pub assignment: Assignment,
    /// `None` when the officer record no longer resolves
    pub officer: Option<OfficerShort>,
}

/// Result of a successful assignment
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssignmentReceipt {
    pub assignment: Assignment,
    /// Ids of assignments closed by this one
    pub closed: Vec<String>,
    /// Refreshed history for the asset, newest first
    pub history: Vec<AssignmentHistoryEntry>,
    /// True when an earlier submission with the same key was returned
    pub replayed: bool,
}
