pub mod session;
pub mod ticket;
