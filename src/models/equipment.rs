//! Equipment (asset) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::assignment::AssignmentHistoryEntry;
use super::enums::EquipmentStatus;
use super::timestamp;

/// Equipment document as stored in the `equipment` collection
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Equipment {
    pub id: String,
    pub name: String,
    /// Free-form category (radio, body camera, firearm, vehicle...)
    pub category: String,
    pub serial_number: String,
    pub department_id: String,
    pub condition: Option<String>,
    pub status: EquipmentStatus,
    /// Officer currently holding the item
    pub assigned_to: Option<String>,
    /// Holder name copied at write time
    pub assigned_to_name: Option<String>,
    /// Handover that last moved this item
    pub handover_id: Option<String>,
    #[serde(with = "timestamp::option")]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub last_updated: DateTime<Utc>,
}

impl Equipment {
    /// Case-insensitive match on name, serial number or category
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query)
            || self.serial_number.to_lowercase().contains(&query)
            || self.category.to_lowercase().contains(&query)
    }
}

/// Create equipment request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(custom(function = "crate::validation::non_blank", message = "Name is required"))]
    pub name: String,
    #[validate(custom(function = "crate::validation::non_blank", message = "Category is required"))]
    pub category: String,
    #[validate(custom(function = "crate::validation::non_blank", message = "Serial number is required"))]
    pub serial_number: String,
    #[validate(custom(function = "crate::validation::non_blank", message = "Department is required"))]
    pub department_id: String,
    pub condition: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
}

/// Equipment list filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct EquipmentQuery {
    pub department_id: Option<String>,
    pub assigned_to: Option<String>,
    pub status: Option<EquipmentStatus>,
    /// Matches name, serial number or category
    pub search: Option<String>,
}

/// Who holds an asset according to its newest assignment
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrentHolder {
    pub officer_id: String,
    pub officer_name: String,
    pub assignment_id: String,
}

/// Asset details with its assignment history, newest first
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssetOverview {
    pub asset: Equipment,
    /// `None` when the asset is available
    pub current_holder: Option<CurrentHolder>,
    pub history: Vec<AssignmentHistoryEntry>,
}
