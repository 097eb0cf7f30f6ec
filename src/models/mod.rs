//! Data models for Precinct

pub mod assignment;
pub mod enums;
pub mod equipment;
pub mod handover;
pub mod idempotency;
pub mod officer;
pub mod timestamp;

// Re-export commonly used types
pub use assignment::{Assignment, AssignmentHistoryEntry, AssignmentReceipt, CreateAssignment};
pub use enums::{EquipmentStatus, HandoverStatus, Rank, RecordStatus};
pub use equipment::{AssetOverview, CreateEquipment, Equipment, EquipmentQuery};
pub use handover::{CreateHandover, Handover, HandoverReceipt, ItemFailure, ItemFailureReason};
pub use officer::{Officer, OfficerClaims, OfficerContext, OfficerShort};
