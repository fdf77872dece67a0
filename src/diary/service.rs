use std::sync::Arc;
use tracing::{info, instrument};

use super::models::{CreateDiaryEntryRequest, DiaryEntryModel, NewDiaryEntry};
use super::repository::DiaryRepository;
use crate::ownership::authorize_owner;
use crate::pets::repository::PetRepository;
use crate::shared::AppError;

/// Service for pet diary entries. Entries have no owner of their own;
/// access is decided by the owning pet.
pub struct DiaryService {
    repository: Arc<dyn DiaryRepository + Send + Sync>,
    pets: Arc<dyn PetRepository + Send + Sync>,
}

impl DiaryService {
    pub fn new(
        repository: Arc<dyn DiaryRepository + Send + Sync>,
        pets: Arc<dyn PetRepository + Send + Sync>,
    ) -> Self {
        Self { repository, pets }
    }

    /// Adds a diary entry to a pet the caller may access
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        pet_id: i64,
        request: CreateDiaryEntryRequest,
        caller_id: i64,
    ) -> Result<DiaryEntryModel, AppError> {
        self.check_pet_access(pet_id, caller_id).await?;

        let entry = self
            .repository
            .create(&NewDiaryEntry {
                pet_id,
                entry_date: request.date,
                notes: request.notes,
            })
            .await?;

        info!(entry_id = entry.id, pet_id = pet_id, "Diary entry created");
        Ok(entry)
    }

    /// Lists a pet's diary entries for a caller the guard permits
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        pet_id: i64,
        caller_id: i64,
    ) -> Result<Vec<DiaryEntryModel>, AppError> {
        self.check_pet_access(pet_id, caller_id).await?;
        self.repository.find_by_pet(pet_id).await
    }

    async fn check_pet_access(&self, pet_id: i64, caller_id: i64) -> Result<(), AppError> {
        let pet = self
            .pets
            .find_by_id(pet_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pet with id {} not found", pet_id)))?;

        authorize_owner(pet.owner_id, caller_id)
    }
}
