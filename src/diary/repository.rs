use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{DiaryEntryModel, NewDiaryEntry};
use crate::shared::AppError;

/// Trait for diary-entry storage operations
#[async_trait]
pub trait DiaryRepository {
    async fn create(&self, entry: &NewDiaryEntry) -> Result<DiaryEntryModel, AppError>;
    async fn find_by_pet(&self, pet_id: i64) -> Result<Vec<DiaryEntryModel>, AppError>;
}

/// In-memory implementation of DiaryRepository for development and testing
pub struct InMemoryDiaryRepository {
    entries: Mutex<HashMap<i64, DiaryEntryModel>>,
    next_id: AtomicI64,
}

impl Default for InMemoryDiaryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDiaryRepository {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl DiaryRepository for InMemoryDiaryRepository {
    #[instrument(skip(self, entry))]
    async fn create(&self, entry: &NewDiaryEntry) -> Result<DiaryEntryModel, AppError> {
        let mut entries = self.entries.lock().unwrap();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let model = DiaryEntryModel {
            id,
            pet_id: entry.pet_id,
            entry_date: entry.entry_date,
            notes: entry.notes.clone(),
        };
        entries.insert(id, model.clone());

        debug!(entry_id = id, pet_id = entry.pet_id, "Diary entry created in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn find_by_pet(&self, pet_id: i64) -> Result<Vec<DiaryEntryModel>, AppError> {
        let entries = self.entries.lock().unwrap();
        let mut found: Vec<DiaryEntryModel> = entries
            .values()
            .filter(|e| e.pet_id == pet_id)
            .cloned()
            .collect();
        found.sort_by_key(|e| e.id);
        Ok(found)
    }
}

/// PostgreSQL implementation of diary repository
pub struct PostgresDiaryRepository {
    pool: PgPool,
}

impl PostgresDiaryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiaryRepository for PostgresDiaryRepository {
    #[instrument(skip(self, entry))]
    async fn create(&self, entry: &NewDiaryEntry) -> Result<DiaryEntryModel, AppError> {
        let row = sqlx::query(
            "INSERT INTO diary_entries (pet_id, entry_date, notes) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(entry.pet_id)
        .bind(entry.entry_date)
        .bind(&entry.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, pet_id = entry.pet_id, "Failed to create diary entry");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(DiaryEntryModel {
            id: row.get("id"),
            pet_id: entry.pet_id,
            entry_date: entry.entry_date,
            notes: entry.notes.clone(),
        })
    }

    #[instrument(skip(self))]
    async fn find_by_pet(&self, pet_id: i64) -> Result<Vec<DiaryEntryModel>, AppError> {
        let rows = sqlx::query(
            "SELECT id, pet_id, entry_date, notes FROM diary_entries \
             WHERE pet_id = $1 ORDER BY id",
        )
        .bind(pet_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, pet_id = pet_id, "Failed to list diary entries");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(rows
            .iter()
            .map(|row| DiaryEntryModel {
                id: row.get("id"),
                pet_id: row.get("pet_id"),
                entry_date: row.get("entry_date"),
                notes: row.get("notes"),
            })
            .collect())
    }
}
