//! Record types held by the in-memory store

use serde::{Deserialize, Serialize};

/// Reserved id meaning "no user"; never assigned to a real account.
pub const NO_USER: u32 = 0;

/// Registered account. Email is the login key but is not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A note as returned to its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: u32,
    pub note: String,
    #[serde(rename = "userID")]
    pub user_id: u32,
}

/// Issued login session. Never expires and is never serialized to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub user_id: u32,
    pub logged_in: bool,
}
