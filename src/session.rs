use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{error::AppError, state::AppState};

pub const SESSION_COOKIE: &str = "session";

/// The explicit session context handed to handlers: who is logged in, their
/// role, and the transient vehicle id held between viewing and confirming a
/// reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: i32,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fahrzeug_id: Option<i32>,
    pub iat: usize,
    pub exp: usize,
}

impl SessionClaims {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

/// Signing and verification keys for the session cookie.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_minutes: i64,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        let session = &state.config.session;
        Self {
            encoding: EncodingKey::from_secret(session.secret.as_bytes()),
            decoding: DecodingKey::from_secret(session.secret.as_bytes()),
            ttl_minutes: session.ttl_minutes,
        }
    }
}

impl SessionKeys {
    pub fn sign(
        &self,
        user_id: i32,
        username: &str,
        role: Option<String>,
        fahrzeug_id: Option<i32>,
    ) -> Result<String, AppError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::minutes(self.ttl_minutes);
        let claims = SessionClaims {
            sub: user_id,
            username: username.to_string(),
            role,
            fahrzeug_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("session sign: {e}")))?;
        debug!(user_id = %user_id, "session signed");
        Ok(token)
    }

    /// Re-sign an existing session with a new pending-reservation vehicle id,
    /// refreshing the expiry.
    pub fn reissue(
        &self,
        claims: &SessionClaims,
        fahrzeug_id: Option<i32>,
    ) -> Result<String, AppError> {
        self.sign(claims.sub, &claims.username, claims.role.clone(), fahrzeug_id)
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        let validation = Validation::default();
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| AppError::Unauthorized(format!("invalid session: {e}")))?;
        Ok(data.claims)
    }

    pub fn cookie(&self, token: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(SESSION_COOKIE, token);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_max_age(TimeDuration::minutes(self.ttl_minutes));
        cookie
    }

    pub fn removal() -> Cookie<'static> {
        let mut cookie = Cookie::from(SESSION_COOKIE);
        cookie.set_path("/");
        cookie
    }
}

fn claims_from_parts<S>(parts: &Parts, state: &S) -> Result<SessionClaims, AppError>
where
    SessionKeys: FromRef<S>,
{
    let keys = SessionKeys::from_ref(state);
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::Unauthorized("not logged in".into()))?;
    keys.verify(&token)
}

/// Any authenticated user.
pub struct Session(pub SessionClaims);

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims = claims_from_parts(parts, state).map_err(|e| {
            warn!("rejected request without valid session");
            e
        })?;
        Ok(Session(claims))
    }
}

/// Authenticated user carrying the "admin" role.
pub struct AdminSession(pub SessionClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims = claims_from_parts(parts, state)?;
        if !claims.is_admin() {
            warn!(username = %claims.username, "admin gate rejected non-admin user");
            return Err(AppError::Forbidden("admin role required".into()));
        }
        Ok(AdminSession(claims))
    }
}

/// Session if one is present; never rejects.
pub struct OptionalSession(pub Option<SessionClaims>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalSession(claims_from_parts(parts, state).ok()))
    }
}
