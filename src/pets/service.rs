use std::sync::Arc;
use tracing::{info, instrument};

use super::models::{NewPetRecord, PetModel, STATUS_AVAILABLE};
use super::repository::PetRepository;
use super::types::{CreatePetRequest, UpdatePetRequest};
use crate::ownership::{authorize_owner, authorize_self};
use crate::shared::AppError;
use crate::users::UsersService;

/// Service for pet records. Every caller-scoped operation runs the
/// shared ownership check before touching storage.
pub struct PetsService {
    repository: Arc<dyn PetRepository + Send + Sync>,
    users: Arc<UsersService>,
}

impl PetsService {
    pub fn new(repository: Arc<dyn PetRepository + Send + Sync>, users: Arc<UsersService>) -> Self {
        Self { repository, users }
    }

    /// Registers a pet. An initial owner may be named only if it is the
    /// caller themself; otherwise the pet starts unclaimed.
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        request: CreatePetRequest,
        caller_id: i64,
    ) -> Result<PetModel, AppError> {
        if let Some(owner_id) = request.owner_id {
            authorize_self(owner_id, caller_id)?;
            self.ensure_user_exists(owner_id).await?;
        }

        let record = NewPetRecord {
            name: request.name,
            species: request.species,
            breed: request.breed,
            age: request.age,
            photo_url: request.photo_url,
            status: STATUS_AVAILABLE.to_string(),
            owner_id: request.owner_id,
        };

        let pet = self.repository.create(&record).await?;
        info!(pet_id = pet.id, "Pet registered");
        Ok(pet)
    }

    /// Fetches a pet the caller is allowed to see
    #[instrument(skip(self))]
    pub async fn get_pet(&self, id: i64, caller_id: i64) -> Result<PetModel, AppError> {
        let pet = self.find_existing(id).await?;
        authorize_owner(pet.owner_id, caller_id)?;
        Ok(pet)
    }

    /// Lists every pet; the public adoption catalogue
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<PetModel>, AppError> {
        self.repository.find_all().await
    }

    /// Lists a user's pets; callers may only query themselves
    #[instrument(skip(self))]
    pub async fn list_by_owner(
        &self,
        user_id: i64,
        caller_id: i64,
    ) -> Result<Vec<PetModel>, AppError> {
        authorize_self(user_id, caller_id)?;
        self.ensure_user_exists(user_id).await?;
        self.repository.find_by_owner(user_id).await
    }

    /// Claims a pet for a user. Callers claim only for themselves, and
    /// only pets that are unclaimed or already theirs.
    #[instrument(skip(self))]
    pub async fn assign(
        &self,
        pet_id: i64,
        user_id: i64,
        caller_id: i64,
    ) -> Result<PetModel, AppError> {
        authorize_self(user_id, caller_id)?;

        let pet = self.find_existing(pet_id).await?;
        self.ensure_user_exists(user_id).await?;
        authorize_owner(pet.owner_id, caller_id)?;

        let assigned = self.repository.assign_owner(pet_id, user_id).await?;
        info!(pet_id = pet_id, user_id = user_id, "Pet assigned to user");
        Ok(assigned)
    }

    /// Updates a pet's details after the ownership check
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: i64,
        request: UpdatePetRequest,
        caller_id: i64,
    ) -> Result<PetModel, AppError> {
        let mut pet = self.find_existing(id).await?;
        authorize_owner(pet.owner_id, caller_id)?;

        if let Some(name) = request.name {
            pet.name = name;
        }
        if let Some(species) = request.species {
            pet.species = species;
        }
        if request.breed.is_some() {
            pet.breed = request.breed;
        }
        if request.age.is_some() {
            pet.age = request.age;
        }
        if request.photo_url.is_some() {
            pet.photo_url = request.photo_url;
        }
        if let Some(status) = request.status {
            pet.status = status;
        }

        self.repository.update(&pet).await
    }

    /// Deletes a pet after the ownership check
    #[instrument(skip(self))]
    pub async fn remove(&self, id: i64, caller_id: i64) -> Result<(), AppError> {
        let pet = self.find_existing(id).await?;
        authorize_owner(pet.owner_id, caller_id)?;

        self.repository.delete(id).await?;
        info!(pet_id = id, "Pet deleted");
        Ok(())
    }

    async fn find_existing(&self, id: i64) -> Result<PetModel, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pet with id {} not found", id)))
    }

    async fn ensure_user_exists(&self, user_id: i64) -> Result<(), AppError> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                user_id
            )));
        }
        Ok(())
    }
}
