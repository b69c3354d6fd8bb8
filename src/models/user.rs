// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,

    pub username: String,

    pub email: Option<String>,

    /// e.g. 'SuperAdmin', 'Interviewer', 'HRM', 'Student'.
    pub role: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
