use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for pet diary entries
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DiaryEntryModel {
    pub id: i64,
    pub pet_id: i64,
    pub entry_date: DateTime<Utc>,
    pub notes: String,
}

/// Insertion payload for a new diary entry
#[derive(Debug, Clone)]
pub struct NewDiaryEntry {
    pub pet_id: i64,
    pub entry_date: DateTime<Utc>,
    pub notes: String,
}

/// Request body for POST /pets/:id/diary
#[derive(Debug, Deserialize)]
pub struct CreateDiaryEntryRequest {
    pub date: DateTime<Utc>,
    pub notes: String,
}
