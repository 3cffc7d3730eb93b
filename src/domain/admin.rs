use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const ADMIN_ROLE: &str = "ADMIN";

#[derive(Debug, Clone)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub role: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub role: String,
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub role: String,
}

/// Identity carried by a validated token.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub username: String,
    pub role: String,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}
