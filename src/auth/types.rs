use serde::{Deserialize, Serialize};

/// JWT claims embedded in every access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessClaims {
    pub sub: i64, // user id (standard JWT subject claim)
    pub username: String,
    pub email: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// Request body for POST /auth/login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for POST /auth/register
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for POST /auth/refresh and POST /auth/logout
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// The session pair handed back by login, register and refresh.
/// Never persisted; the refresh token exists in storage only as a hash.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}
