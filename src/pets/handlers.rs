use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::instrument;

use super::models::PetModel;
use super::types::{AssignPetRequest, CreatePetRequest, UpdatePetRequest};
use crate::auth::AccessClaims;
use crate::shared::{AppError, AppState};

/// GET /pets (public)
#[instrument(name = "list_pets", skip(state))]
pub async fn list_pets(State(state): State<AppState>) -> Result<Json<Vec<PetModel>>, AppError> {
    Ok(Json(state.pets_service.list_all().await?))
}

/// POST /pets (protected)
#[instrument(name = "create_pet", skip(state, claims, dto))]
pub async fn create_pet(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessClaims>,
    Json(dto): Json<CreatePetRequest>,
) -> Result<Json<PetModel>, AppError> {
    Ok(Json(state.pets_service.create(dto, claims.sub).await?))
}

/// GET /pets/:id (protected)
#[instrument(name = "get_pet", skip(state, claims))]
pub async fn get_pet(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessClaims>,
    Path(id): Path<i64>,
) -> Result<Json<PetModel>, AppError> {
    Ok(Json(state.pets_service.get_pet(id, claims.sub).await?))
}

/// PUT /pets/:id (protected)
#[instrument(name = "update_pet", skip(state, claims, dto))]
pub async fn update_pet(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessClaims>,
    Path(id): Path<i64>,
    Json(dto): Json<UpdatePetRequest>,
) -> Result<Json<PetModel>, AppError> {
    Ok(Json(state.pets_service.update(id, dto, claims.sub).await?))
}

/// DELETE /pets/:id (protected)
#[instrument(name = "delete_pet", skip(state, claims))]
pub async fn delete_pet(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessClaims>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    state.pets_service.remove(id, claims.sub).await?;
    Ok(Json(json!({ "removed": true })))
}

/// POST /pets/:id/assign (protected)
#[instrument(name = "assign_pet", skip(state, claims, dto))]
pub async fn assign_pet(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessClaims>,
    Path(id): Path<i64>,
    Json(dto): Json<AssignPetRequest>,
) -> Result<Json<PetModel>, AppError> {
    Ok(Json(
        state.pets_service.assign(id, dto.user_id, claims.sub).await?,
    ))
}

/// GET /users/:id/pets (protected)
#[instrument(name = "list_user_pets", skip(state, claims))]
pub async fn list_user_pets(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessClaims>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<PetModel>>, AppError> {
    Ok(Json(state.pets_service.list_by_owner(id, claims.sub).await?))
}
