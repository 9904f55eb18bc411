// src/dtos/ticketdtos.rs
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use crate::models::ticket::{BlockType, ReporterRole, SubBlock, WorkType};

/// Input to [`TicketStore::create`]. The store accepts any well-typed draft;
/// validation is the caller's job and these derives encode the rules the
/// raise-ticket form enforces before submitting.
///
/// [`TicketStore::create`]: crate::store::ticket_store::TicketStore::create
#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct TicketDraft {
    #[validate(length(min = 1, message = "Reporter id is required"))]
    pub user_id: String,

    #[validate(length(min = 1, message = "Reporter name is required"))]
    pub user_name: String,

    pub user_role: ReporterRole,

    pub block_type: BlockType,

    pub sub_block: Option<SubBlock>,

    pub work_type: WorkType,

    #[validate(length(min = 1, message = "Describe the issue"))]
    pub description: String,

    #[validate(length(min = 1, message = "Enter floor number"))]
    pub floor_no: String,

    #[validate(length(min = 1, message = "Enter wing"))]
    pub wing: String,
}

impl TicketDraft {
    /// Sub-block is meaningful only for academic blocks: required there,
    /// rejected for hostel tickets.
    pub fn validate_sub_block(&self) -> Result<(), ValidationError> {
        match (self.block_type, self.sub_block) {
            (BlockType::Academic, None) => {
                let mut error = ValidationError::new("sub_block_required");
                error.message = Some(Cow::from("Select a sub-block"));
                Err(error)
            }
            (BlockType::Hostel, Some(_)) => {
                let mut error = ValidationError::new("sub_block_not_allowed");
                error.message = Some(Cow::from("Sub-block applies to academic blocks only"));
                Err(error)
            }
            _ => Ok(()),
        }
    }

    /// Trims the free-text fields, the same normalization the form applies
    /// before submitting.
    pub fn trimmed(mut self) -> Self {
        self.user_id = self.user_id.trim().to_string();
        self.user_name = self.user_name.trim().to_string();
        self.description = self.description.trim().to_string();
        self.floor_no = self.floor_no.trim().to_string();
        self.wing = self.wing.trim().to_string();
        self
    }
}
