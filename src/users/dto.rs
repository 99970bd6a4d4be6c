use serde::{Deserialize, Serialize};

/// Registration input: credentials plus the person data created alongside.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisteredResponse {
    pub user_id: i32,
    pub person_id: i32,
}

/// Public session user returned after login.
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
    pub role: Option<String>,
}
