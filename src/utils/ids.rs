// utils/ids.rs
use uuid::Uuid;

/// Fresh ticket identifier. Random v4, assigned once at creation.
pub fn new_ticket_id() -> Uuid {
    Uuid::new_v4()
}
