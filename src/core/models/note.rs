use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::core::models::application::Role;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Note {
    pub id: i32,
    pub role: Role,
    pub owner_login_id: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
