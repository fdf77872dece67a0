use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{self, handlers as auth_handlers};
use crate::diary::handlers as diary_handlers;
use crate::pets::handlers as pet_handlers;
use crate::shared::AppState;

/// Assembles the full application router. Kept separate from main so the
/// integration tests can drive the exact same routes.
pub fn build_router(state: AppState, cors_allowed_origins: &[String]) -> Router {
    let public_routes = Router::new()
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/register", post(auth_handlers::register))
        .route("/auth/refresh", post(auth_handlers::refresh))
        .route("/auth/logout", post(auth_handlers::logout))
        .route("/pets", get(pet_handlers::list_pets));

    let protected_routes = Router::new()
        .route("/auth/profile", get(auth_handlers::profile))
        .route("/pets", post(pet_handlers::create_pet))
        .route(
            "/pets/:id",
            get(pet_handlers::get_pet)
                .put(pet_handlers::update_pet)
                .delete(pet_handlers::delete_pet),
        )
        .route("/pets/:id/assign", post(pet_handlers::assign_pet))
        .route("/users/:id/pets", get(pet_handlers::list_user_pets))
        .route(
            "/pets/:id/diary",
            post(diary_handlers::create_entry).get(diary_handlers::list_entries),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::jwt_auth));

    public_routes
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_allowed_origins))
        .with_state(state)
}

/// Builds the CORS layer from the configured allowlist; an empty list
/// falls back to a permissive development policy.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
