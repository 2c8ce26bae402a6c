use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub email: String,
    /// Argon2 hash; NULL for OAuth-only accounts
    pub password: Option<String>,
    pub google_id: Option<String>,
    pub role_id: u8,
}
