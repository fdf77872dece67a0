use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for pets. `owner_id` is nullable: an unclaimed pet is
/// open to any authenticated caller until someone adopts it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PetModel {
    pub id: i64,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub photo_url: Option<String>,
    pub status: String,
    pub owner_id: Option<i64>,
    pub registered_at: DateTime<Utc>,
}

/// Insertion payload for a new pet record
#[derive(Debug, Clone)]
pub struct NewPetRecord {
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub photo_url: Option<String>,
    pub status: String,
    pub owner_id: Option<i64>,
}

pub const STATUS_AVAILABLE: &str = "AVAILABLE";
