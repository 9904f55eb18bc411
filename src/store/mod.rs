pub mod error;
pub mod session_store;
pub mod ticket_store;
