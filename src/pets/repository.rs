use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{NewPetRecord, PetModel};
use crate::shared::AppError;

/// Trait for pet storage operations
#[async_trait]
pub trait PetRepository {
    async fn create(&self, pet: &NewPetRecord) -> Result<PetModel, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<PetModel>, AppError>;
    async fn find_all(&self) -> Result<Vec<PetModel>, AppError>;
    async fn find_by_owner(&self, user_id: i64) -> Result<Vec<PetModel>, AppError>;
    async fn update(&self, pet: &PetModel) -> Result<PetModel, AppError>;
    async fn assign_owner(&self, pet_id: i64, user_id: i64) -> Result<PetModel, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

/// In-memory implementation of PetRepository for development and testing
pub struct InMemoryPetRepository {
    pets: Mutex<HashMap<i64, PetModel>>,
    next_id: AtomicI64,
}

impl Default for InMemoryPetRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPetRepository {
    pub fn new() -> Self {
        Self {
            pets: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl PetRepository for InMemoryPetRepository {
    #[instrument(skip(self, pet))]
    async fn create(&self, pet: &NewPetRecord) -> Result<PetModel, AppError> {
        let mut pets = self.pets.lock().unwrap();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let model = PetModel {
            id,
            name: pet.name.clone(),
            species: pet.species.clone(),
            breed: pet.breed.clone(),
            age: pet.age,
            photo_url: pet.photo_url.clone(),
            status: pet.status.clone(),
            owner_id: pet.owner_id,
            registered_at: Utc::now(),
        };
        pets.insert(id, model.clone());

        debug!(pet_id = id, name = %pet.name, "Pet created in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<PetModel>, AppError> {
        let pets = self.pets.lock().unwrap();
        Ok(pets.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<PetModel>, AppError> {
        let pets = self.pets.lock().unwrap();
        let mut all: Vec<PetModel> = pets.values().cloned().collect();
        all.sort_by_key(|p| p.id);
        Ok(all)
    }

    #[instrument(skip(self))]
    async fn find_by_owner(&self, user_id: i64) -> Result<Vec<PetModel>, AppError> {
        let pets = self.pets.lock().unwrap();
        let mut owned: Vec<PetModel> = pets
            .values()
            .filter(|p| p.owner_id == Some(user_id))
            .cloned()
            .collect();
        owned.sort_by_key(|p| p.id);
        Ok(owned)
    }

    #[instrument(skip(self, pet))]
    async fn update(&self, pet: &PetModel) -> Result<PetModel, AppError> {
        let mut pets = self.pets.lock().unwrap();
        if !pets.contains_key(&pet.id) {
            warn!(pet_id = pet.id, "Pet not found for update in memory");
            return Err(AppError::NotFound("Pet not found".to_string()));
        }
        pets.insert(pet.id, pet.clone());
        Ok(pet.clone())
    }

    #[instrument(skip(self))]
    async fn assign_owner(&self, pet_id: i64, user_id: i64) -> Result<PetModel, AppError> {
        let mut pets = self.pets.lock().unwrap();
        let pet = pets
            .get_mut(&pet_id)
            .ok_or_else(|| AppError::NotFound("Pet not found".to_string()))?;

        pet.owner_id = Some(user_id);
        debug!(pet_id = pet_id, user_id = user_id, "Pet assigned in memory");
        Ok(pet.clone())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut pets = self.pets.lock().unwrap();
        if pets.remove(&id).is_none() {
            warn!(pet_id = id, "Pet not found for deletion in memory");
            return Err(AppError::NotFound("Pet not found".to_string()));
        }
        Ok(())
    }
}

/// PostgreSQL implementation of pet repository
pub struct PostgresPetRepository {
    pool: PgPool,
}

impl PostgresPetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_model(row: &sqlx::postgres::PgRow) -> PetModel {
        PetModel {
            id: row.get("id"),
            name: row.get("name"),
            species: row.get("species"),
            breed: row.get("breed"),
            age: row.get("age"),
            photo_url: row.get("photo_url"),
            status: row.get("status"),
            owner_id: row.get("owner_id"),
            registered_at: row.get("registered_at"),
        }
    }
}

const PET_COLUMNS: &str =
    "id, name, species, breed, age, photo_url, status, owner_id, registered_at";

#[async_trait]
impl PetRepository for PostgresPetRepository {
    #[instrument(skip(self, pet))]
    async fn create(&self, pet: &NewPetRecord) -> Result<PetModel, AppError> {
        let now = Utc::now();
        let row = sqlx::query(
            "INSERT INTO pets (name, species, breed, age, photo_url, status, owner_id, registered_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(&pet.name)
        .bind(&pet.species)
        .bind(&pet.breed)
        .bind(pet.age)
        .bind(&pet.photo_url)
        .bind(&pet.status)
        .bind(pet.owner_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create pet in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(PetModel {
            id: row.get("id"),
            name: pet.name.clone(),
            species: pet.species.clone(),
            breed: pet.breed.clone(),
            age: pet.age,
            photo_url: pet.photo_url.clone(),
            status: pet.status.clone(),
            owner_id: pet.owner_id,
            registered_at: now,
        })
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<PetModel>, AppError> {
        let row = sqlx::query(&format!("SELECT {PET_COLUMNS} FROM pets WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, pet_id = id, "Failed to fetch pet from database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(row.as_ref().map(Self::row_to_model))
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<PetModel>, AppError> {
        let rows = sqlx::query(&format!("SELECT {PET_COLUMNS} FROM pets ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to list pets from database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(rows.iter().map(Self::row_to_model).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_owner(&self, user_id: i64) -> Result<Vec<PetModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {PET_COLUMNS} FROM pets WHERE owner_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = user_id, "Failed to list pets by owner");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(rows.iter().map(Self::row_to_model).collect())
    }

    #[instrument(skip(self, pet))]
    async fn update(&self, pet: &PetModel) -> Result<PetModel, AppError> {
        let result = sqlx::query(
            "UPDATE pets SET name = $2, species = $3, breed = $4, age = $5, \
             photo_url = $6, status = $7 WHERE id = $1",
        )
        .bind(pet.id)
        .bind(&pet.name)
        .bind(&pet.species)
        .bind(&pet.breed)
        .bind(pet.age)
        .bind(&pet.photo_url)
        .bind(&pet.status)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, pet_id = pet.id, "Failed to update pet in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Pet not found".to_string()));
        }

        Ok(pet.clone())
    }

    #[instrument(skip(self))]
    async fn assign_owner(&self, pet_id: i64, user_id: i64) -> Result<PetModel, AppError> {
        let row = sqlx::query(&format!(
            "UPDATE pets SET owner_id = $2 WHERE id = $1 RETURNING {PET_COLUMNS}"
        ))
        .bind(pet_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, pet_id = pet_id, "Failed to assign pet in database");
            AppError::DatabaseError(e.to_string())
        })?;

        row.as_ref()
            .map(Self::row_to_model)
            .ok_or_else(|| AppError::NotFound("Pet not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, pet_id = id, "Failed to delete pet from database");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Pet not found".to_string()));
        }

        Ok(())
    }
}
