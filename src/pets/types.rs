use serde::Deserialize;

/// Request body for POST /pets
#[derive(Debug, Deserialize)]
pub struct CreatePetRequest {
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub photo_url: Option<String>,
    /// Optional initial owner; may only name the caller themself
    pub owner_id: Option<i64>,
}

/// Request body for PUT /pets/:id; unset fields are left untouched
#[derive(Debug, Deserialize)]
pub struct UpdatePetRequest {
    pub name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub photo_url: Option<String>,
    pub status: Option<String>,
}

/// Request body for POST /pets/:id/assign
#[derive(Debug, Deserialize)]
pub struct AssignPetRequest {
    pub user_id: i64,
}
