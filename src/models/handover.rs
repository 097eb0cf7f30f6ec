//! Equipment handover model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::enums::HandoverStatus;
use super::timestamp;

/// Handover document as stored in the `handovers` collection
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Handover {
    pub id: String,
    pub from_officer_id: String,
    pub from_officer_name: String,
    pub to_officer_id: String,
    pub to_officer_name: String,
    pub equipment_ids: Vec<String>,
    pub notes: String,
    pub department_id: String,
    pub status: HandoverStatus,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Handover request; the sender is the signed-in officer
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateHandover {
    #[validate(custom(
        function = "crate::validation::non_blank",
        message = "Please select an officer to hand over equipment to"
    ))]
    pub to_officer_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Please select at least one equipment item"))]
    pub equipment_ids: Vec<String>,
    #[validate(custom(
        function = "crate::validation::non_blank",
        message = "Please provide handover notes for documentation"
    ))]
    pub notes: String,
    /// Client token making resubmission safe
    pub idempotency_key: Option<String>,
}

/// Why a single item blocked a handover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemFailureReason {
    NotFound,
    NotHeldBySender,
}

/// Per-item outcome of a rejected handover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ItemFailure {
    pub equipment_id: String,
    pub reason: ItemFailureReason,
}

/// Result of a successful handover
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HandoverReceipt {
    pub handover: Handover,
    /// True when an earlier submission with the same key was returned
    pub replayed: bool,
}
