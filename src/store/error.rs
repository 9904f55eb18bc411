// src/store/error.rs
use thiserror::Error;
use uuid::Uuid;

use crate::models::ticket::TicketStatus;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Ticket {0} not found")]
    TicketNotFound(Uuid),

    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: TicketStatus,
        to: TicketStatus,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Outcome of reading a persisted entry into memory. Distinguishes "no data
/// yet" from "data present but corrupt", which both leave the resident state
/// empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The entry was present and parsed; carries the number of records.
    Loaded(usize),
    /// No entry was persisted yet.
    Empty,
    /// The entry existed but failed to parse; defaulted to empty.
    Recovered,
}
