use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Individual {
    pub id: i64,
    pub name: String,
    #[serde(rename = "uid")]
    pub owner_id: i64,
    pub description: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIndividual {
    pub name: String,
    pub owner_id: i64,
    pub description: String,
    pub status: String,
}

pub type UpdateIndividual = CreateIndividual;
