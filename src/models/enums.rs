//! Shared status and rank enums.
//!
//! All of these are stored as lowercase strings inside documents, so each one
//! also converts into a `serde_json::Value` for use in query filters.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl From<$name> for serde_json::Value {
            fn from(value: $name) -> Self {
                serde_json::Value::String(value.as_str().to_string())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// RecordStatus
// ---------------------------------------------------------------------------

/// Active/inactive flag shared by officers and assignments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Active,
    Inactive,
}

string_enum!(RecordStatus {
    Active => "active",
    Inactive => "inactive",
});

// ---------------------------------------------------------------------------
// Rank
// ---------------------------------------------------------------------------

/// Officer rank, as chosen at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    #[default]
    Officer,
    Sergeant,
    Lieutenant,
}

string_enum!(Rank {
    Officer => "officer",
    Sergeant => "sergeant",
    Lieutenant => "lieutenant",
});

impl Rank {
    /// Sergeants and lieutenants may register equipment and assign it
    pub fn is_supervisor(&self) -> bool {
        matches!(self, Rank::Sergeant | Rank::Lieutenant)
    }
}

// ---------------------------------------------------------------------------
// EquipmentStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    Available,
    InUse,
    PendingTransfer,
    Maintenance,
}

string_enum!(EquipmentStatus {
    Available => "available",
    InUse => "in_use",
    PendingTransfer => "pending_transfer",
    Maintenance => "maintenance",
});

// ---------------------------------------------------------------------------
// HandoverStatus
// ---------------------------------------------------------------------------

/// Handover lifecycle. Only `Pending` is produced by this server; the
/// acceptance and rejection transitions are not defined yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HandoverStatus {
    Pending,
    Accepted,
    Rejected,
}

string_enum!(HandoverStatus {
    Pending => "pending",
    Accepted => "accepted",
    Rejected => "rejected",
});
