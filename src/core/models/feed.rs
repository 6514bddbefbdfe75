use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::core::models::application::Role;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeedPost {
    pub id: i32,
    pub role: Role,
    pub author_login_id: String,
    pub title: String,
    pub body: String,
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
}
