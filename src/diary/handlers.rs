use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::instrument;

use super::models::{CreateDiaryEntryRequest, DiaryEntryModel};
use crate::auth::AccessClaims;
use crate::shared::{AppError, AppState};

/// POST /pets/:id/diary (protected)
#[instrument(name = "create_diary_entry", skip(state, claims, dto))]
pub async fn create_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessClaims>,
    Path(pet_id): Path<i64>,
    Json(dto): Json<CreateDiaryEntryRequest>,
) -> Result<Json<DiaryEntryModel>, AppError> {
    Ok(Json(
        state.diary_service.create(pet_id, dto, claims.sub).await?,
    ))
}

/// GET /pets/:id/diary (protected)
#[instrument(name = "list_diary_entries", skip(state, claims))]
pub async fn list_entries(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessClaims>,
    Path(pet_id): Path<i64>,
) -> Result<Json<Vec<DiaryEntryModel>>, AppError> {
    Ok(Json(state.diary_service.list(pet_id, claims.sub).await?))
}
