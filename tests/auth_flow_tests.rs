// End-to-end tests driving the assembled router over HTTP semantics:
// session lifecycle (register, login, refresh rotation, logout) and
// ownership enforcement on the pet and diary routes.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Duration;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use pawtrack::app::build_router;
use pawtrack::auth::repository::InMemoryRefreshTokenRepository;
use pawtrack::auth::token::TokenConfig;
use pawtrack::diary::repository::InMemoryDiaryRepository;
use pawtrack::pets::repository::InMemoryPetRepository;
use pawtrack::shared::AppState;
use pawtrack::users::repository::InMemoryUserRepository;

fn test_app() -> Router {
    let token_config = TokenConfig::new(
        "integration-test-secret".to_string(),
        Duration::minutes(15),
        Duration::days(7),
    );
    let state = AppState::new(
        token_config,
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryRefreshTokenRepository::new()),
        Arc::new(InMemoryPetRepository::new()),
        Arc::new(InMemoryDiaryRepository::new()),
    );
    build_router(state, &[])
}

fn post_json(uri: &str, body: Value, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Registers a user and returns (access_token, refresh_token, user_id)
async fn register_user(app: &Router, username: &str, email: &str) -> (String, String, i64) {
    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/register",
            json!({"username": username, "email": email, "password": "123456"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let tokens = body_json(response).await;
    let access = tokens["access_token"].as_str().unwrap().to_string();
    let refresh = tokens["refresh_token"].as_str().unwrap().to_string();

    let profile = app
        .clone()
        .oneshot(get_request("/auth/profile", Some(&access)))
        .await
        .unwrap();
    assert_eq!(profile.status(), StatusCode::OK);
    let claims = body_json(profile).await;
    let user_id = claims["sub"].as_i64().unwrap();

    (access, refresh, user_id)
}

#[tokio::test]
async fn test_full_session_lifecycle() {
    let app = test_app();
    let (access, refresh, _) = register_user(&app, "ada", "ada@example.com").await;

    // Fresh login also works against the registered account
    let login = app
        .clone()
        .oneshot(post_json(
            "/auth/login",
            json!({"email": "ada@example.com", "password": "123456"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);

    // The access token opens protected routes
    let profile = app
        .clone()
        .oneshot(get_request("/auth/profile", Some(&access)))
        .await
        .unwrap();
    assert_eq!(profile.status(), StatusCode::OK);
    let claims = body_json(profile).await;
    assert_eq!(claims["username"], "ada");
    assert_eq!(claims["email"], "ada@example.com");

    // Rotation: the refresh token buys exactly one new pair
    let rotated = app
        .clone()
        .oneshot(post_json(
            "/auth/refresh",
            json!({"refresh_token": refresh}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(rotated.status(), StatusCode::OK);
    let rotated = body_json(rotated).await;
    let new_refresh = rotated["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(new_refresh, refresh);

    // The spent token is dead
    let replay = app
        .clone()
        .oneshot(post_json(
            "/auth/refresh",
            json!({"refresh_token": refresh}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(replay).await;
    assert_eq!(body["error"], "Invalid refresh token");

    // Logout revokes the live token, after which it refuses to refresh
    let logout = app
        .clone()
        .oneshot(post_json(
            "/auth/logout",
            json!({"refresh_token": new_refresh}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::OK);

    let after_logout = app
        .clone()
        .oneshot(post_json(
            "/auth/refresh",
            json!({"refresh_token": new_refresh}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(after_logout.status(), StatusCode::UNAUTHORIZED);

    // Logging out again is still a 200
    let again = app
        .oneshot(post_json(
            "/auth/logout",
            json!({"refresh_token": new_refresh}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_routes_require_bearer_token() {
    let app = test_app();

    let no_header = app
        .clone()
        .oneshot(get_request("/auth/profile", None))
        .await
        .unwrap();
    assert_eq!(no_header.status(), StatusCode::UNAUTHORIZED);

    let garbage = app
        .clone()
        .oneshot(get_request("/auth/profile", Some("not-a-jwt")))
        .await
        .unwrap();
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);

    // The public listing needs no token at all
    let listing = app.oneshot(get_request("/pets", None)).await.unwrap();
    assert_eq!(listing.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_email_and_wrong_password_look_identical() {
    let app = test_app();
    register_user(&app, "ada", "ada@example.com").await;

    let unknown = app
        .clone()
        .oneshot(post_json(
            "/auth/login",
            json!({"email": "nobody@example.com", "password": "123456"}),
            None,
        ))
        .await
        .unwrap();
    let wrong = app
        .oneshot(post_json(
            "/auth/login",
            json!({"email": "ada@example.com", "password": "wrong"}),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(unknown).await, body_json(wrong).await);
}

#[tokio::test]
async fn test_owned_pet_is_hidden_from_other_users() {
    let app = test_app();
    let (ada_token, _, ada_id) = register_user(&app, "ada", "ada@example.com").await;
    let (bob_token, _, _) = register_user(&app, "bob", "bob@example.com").await;

    let created = app
        .clone()
        .oneshot(post_json(
            "/pets",
            json!({"name": "Rex", "species": "dog", "owner_id": ada_id}),
            Some(&ada_token),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::OK);
    let pet = body_json(created).await;
    let pet_id = pet["id"].as_i64().unwrap();

    // The owner reads their own pet
    let own_read = app
        .clone()
        .oneshot(get_request(&format!("/pets/{pet_id}"), Some(&ada_token)))
        .await
        .unwrap();
    assert_eq!(own_read.status(), StatusCode::OK);

    // Anyone else gets a 403, on reads and diary access alike
    let foreign_read = app
        .clone()
        .oneshot(get_request(&format!("/pets/{pet_id}"), Some(&bob_token)))
        .await
        .unwrap();
    assert_eq!(foreign_read.status(), StatusCode::FORBIDDEN);

    let foreign_diary = app
        .oneshot(post_json(
            &format!("/pets/{pet_id}/diary"),
            json!({"date": "2026-08-30T12:00:00Z", "notes": "sneaky entry"}),
            Some(&bob_token),
        ))
        .await
        .unwrap();
    assert_eq!(foreign_diary.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unclaimed_pet_is_open_until_assigned() {
    let app = test_app();
    let (ada_token, _, _) = register_user(&app, "ada", "ada@example.com").await;
    let (bob_token, _, bob_id) = register_user(&app, "bob", "bob@example.com").await;

    // Ada registers a stray with no owner
    let created = app
        .clone()
        .oneshot(post_json(
            "/pets",
            json!({"name": "Whiskers", "species": "cat"}),
            Some(&ada_token),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::OK);
    let pet = body_json(created).await;
    let pet_id = pet["id"].as_i64().unwrap();
    assert!(pet["owner_id"].is_null());

    // While unclaimed, any authenticated user may read and journal it
    let bob_read = app
        .clone()
        .oneshot(get_request(&format!("/pets/{pet_id}"), Some(&bob_token)))
        .await
        .unwrap();
    assert_eq!(bob_read.status(), StatusCode::OK);

    // Bob claims it for himself
    let assign = app
        .clone()
        .oneshot(post_json(
            &format!("/pets/{pet_id}/assign"),
            json!({"user_id": bob_id}),
            Some(&bob_token),
        ))
        .await
        .unwrap();
    assert_eq!(assign.status(), StatusCode::OK);

    // Now Ada is locked out, including from the diary
    let ada_read = app
        .clone()
        .oneshot(get_request(&format!("/pets/{pet_id}"), Some(&ada_token)))
        .await
        .unwrap();
    assert_eq!(ada_read.status(), StatusCode::FORBIDDEN);

    let ada_diary = app
        .clone()
        .oneshot(get_request(&format!("/pets/{pet_id}/diary"), Some(&ada_token)))
        .await
        .unwrap();
    assert_eq!(ada_diary.status(), StatusCode::FORBIDDEN);

    // Bob keeps full access
    let bob_diary = app
        .oneshot(post_json(
            &format!("/pets/{pet_id}/diary"),
            json!({"date": "2026-08-30T12:00:00Z", "notes": "first day home"}),
            Some(&bob_token),
        ))
        .await
        .unwrap();
    assert_eq!(bob_diary.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cannot_claim_pet_for_someone_else() {
    let app = test_app();
    let (ada_token, _, _) = register_user(&app, "ada", "ada@example.com").await;
    let (_, _, bob_id) = register_user(&app, "bob", "bob@example.com").await;

    let created = app
        .clone()
        .oneshot(post_json(
            "/pets",
            json!({"name": "Goldie", "species": "fish"}),
            Some(&ada_token),
        ))
        .await
        .unwrap();
    let pet = body_json(created).await;
    let pet_id = pet["id"].as_i64().unwrap();

    // Ada tries to push the pet onto Bob
    let assign = app
        .oneshot(post_json(
            &format!("/pets/{pet_id}/assign"),
            json!({"user_id": bob_id}),
            Some(&ada_token),
        ))
        .await
        .unwrap();
    assert_eq!(assign.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_own_pets_only() {
    let app = test_app();
    let (ada_token, _, ada_id) = register_user(&app, "ada", "ada@example.com").await;
    let (bob_token, _, bob_id) = register_user(&app, "bob", "bob@example.com").await;

    let created = app
        .clone()
        .oneshot(post_json(
            "/pets",
            json!({"name": "Rex", "species": "dog", "owner_id": ada_id}),
            Some(&ada_token),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::OK);

    // Ada sees her pet in her listing
    let mine = app
        .clone()
        .oneshot(get_request(&format!("/users/{ada_id}/pets"), Some(&ada_token)))
        .await
        .unwrap();
    assert_eq!(mine.status(), StatusCode::OK);
    let pets = body_json(mine).await;
    assert_eq!(pets.as_array().unwrap().len(), 1);

    // Bob cannot browse Ada's listing
    let foreign = app
        .clone()
        .oneshot(get_request(&format!("/users/{ada_id}/pets"), Some(&bob_token)))
        .await
        .unwrap();
    assert_eq!(foreign.status(), StatusCode::FORBIDDEN);

    // Bob's own listing is empty
    let empty = app
        .oneshot(get_request(&format!("/users/{bob_id}/pets"), Some(&bob_token)))
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::OK);
    let pets = body_json(empty).await;
    assert!(pets.as_array().unwrap().is_empty());
}
