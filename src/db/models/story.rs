use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Story {
    pub id: i64,
    pub name: String,
    /// Owning user. Exposed as `uid` on the wire.
    #[serde(rename = "uid")]
    pub owner_id: i64,
    pub description: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub story_type: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStory {
    pub name: String,
    pub owner_id: i64,
    pub description: String,
    pub story_type: String,
}

pub type UpdateStory = CreateStory;
