// src/models/session.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Staff,
    Admin,
}

/// The identity currently signed in on this device. Login is a role
/// selection plus free-text fields; no credential is ever checked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub role: UserRole,
}
