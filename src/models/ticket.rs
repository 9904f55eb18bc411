// src/models/ticket.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    New,
    Pending,
    Closed,
}

impl TicketStatus {
    /// Forward-only lifecycle: new -> pending -> closed. Declaration order
    /// is the lifecycle order, so `Ord` encodes it.
    pub fn can_advance_to(self, next: TicketStatus) -> bool {
        next > self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Academic,
    Hostel,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubBlock {
    #[serde(rename = "AB1")]
    Ab1,
    #[serde(rename = "AB2")]
    Ab2,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkType {
    Electrical,
    Plumbing,
    Carpentry,
}

/// Role of the user who raised the ticket. Admins assign and close tickets
/// but never raise them, so this is narrower than [`UserRole`].
///
/// [`UserRole`]: crate::models::session::UserRole
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReporterRole {
    Student,
    Staff,
}

/// A reported maintenance issue. Serialized field names stay camelCase so
/// the on-device collection written by earlier app versions still parses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub user_role: ReporterRole,
    pub block_type: BlockType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_block: Option<SubBlock>,
    pub work_type: WorkType,
    pub description: String,
    pub floor_no: String,
    pub wing: String,
    pub status: TicketStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_worker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
