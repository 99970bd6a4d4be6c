use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use crate::{
    error::AppError,
    session::SessionKeys,
    state::AppState,
    users::{
        dto::{LoginRequest, RegisterRequest, RegisteredResponse, SessionUser},
        store::NewUser,
    },
    validation,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Registration creates the user row and its person row together. No session
/// is issued; the client logs in afterwards.
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisteredResponse>), AppError> {
    validation::validate_username(&payload.username)?;
    validation::validate_password(&payload.password)?;
    validation::validate_person_name(&payload.name)?;
    let email = payload.email.trim().to_lowercase();
    validation::validate_email(&email)?;

    let user_id = state
        .users
        .register(&NewUser {
            username: payload.username.clone(),
            password: payload.password,
            is_admin: payload.is_admin,
        })
        .await?;

    let person_id = state
        .vehicles
        .insert_person(&payload.name, &email, user_id)
        .await?;

    info!(user_id = %user_id, person_id = %person_id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisteredResponse { user_id, person_id }),
    ))
}

/// Login verifies credentials, loads id and admin flag, and issues the
/// session cookie. Failures name neither credential.
#[instrument(skip(state, jar, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionUser>), AppError> {
    let ok = state
        .users
        .verify_login(&payload.username, &payload.password)
        .await?;
    if !ok {
        warn!("login rejected");
        return Err(AppError::Unauthorized("invalid credentials".into()));
    }

    let user_id = state
        .users
        .user_id(&payload.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid credentials".into()))?;
    let role = if state.users.is_admin(&payload.username).await? {
        Some("admin".to_string())
    } else {
        None
    };

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user_id, &payload.username, role.clone(), None)?;
    let jar = jar.add(keys.cookie(token));

    info!(user_id = %user_id, "user logged in");
    Ok((
        jar,
        Json(SessionUser {
            id: user_id,
            username: payload.username,
            role,
        }),
    ))
}

#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(SessionKeys::removal());
    (jar, StatusCode::NO_CONTENT)
}
