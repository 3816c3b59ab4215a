use std::time::{SystemTime, UNIX_EPOCH};

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use cookbook_shared::Actor;
use cookbook_user::UserRow;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::JwtConfig, error::AppError, routes::AppState};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    /// Access token row id.
    pub jti: String,
    pub iat: u64,
    pub exp: u64,
    pub iss: String,
    pub aud: String,
}

fn unix_now() -> anyhow::Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

pub fn generate_token(config: &JwtConfig, user_id: i64, access_id: &str) -> anyhow::Result<String> {
    let now = unix_now()?;
    let claims = Claims {
        sub: user_id.to_string(),
        jti: access_id.to_owned(),
        iat: now,
        exp: now + (config.expiration_minutes.max(1) as u64) * 60,
        iss: config.issuer.to_owned(),
        aud: config.audience.to_owned(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok(token)
}

fn validation(config: &JwtConfig) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[config.issuer.to_owned()]);
    validation.set_audience(&[config.audience.to_owned()]);
    validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
    validation
}

/// Verifies signature, issuer, audience and expiry.
pub fn verify_token(config: &JwtConfig, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation(config),
    )
    .ok()
    .map(|data| data.claims)
}

/// Like [`verify_token`], but an expired token is accepted for
/// `refresh_window_minutes` after its `exp`.
pub fn verify_refreshable_token(config: &JwtConfig, token: &str) -> Option<Claims> {
    let mut validation = validation(config);
    validation.validate_exp = false;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .ok()?
    .claims;

    let window = (config.refresh_window_minutes.max(0) as u64) * 60;
    let now = unix_now().ok()?;
    if claims.exp + window < now {
        return None;
    }

    Some(claims)
}

async fn bearer_token(parts: &mut Parts, state: &AppState) -> Option<String> {
    TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
        .await
        .ok()
        .map(|TypedHeader(Authorization(bearer))| bearer.token().to_owned())
}

/// The user behind a live bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: UserRow,
    pub access_id: String,
}

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.user.id,
            is_admin: self.user.is_admin,
        }
    }

    async fn resolve(state: &AppState, claims: Claims) -> Result<Option<Self>, AppError> {
        let Some((access, user)) = state.user_command.find_access(claims.jti).await? else {
            return Ok(None);
        };

        if access.user_id.to_string() != claims.sub {
            tracing::warn!(access_id = %access.id, "token subject does not match access row");
            return Ok(None);
        }

        Ok(Some(AuthUser {
            user,
            access_id: access.id,
        }))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts, state)
            .await
            .ok_or_else(AppError::unauthenticated)?;

        let claims =
            verify_token(&state.config.jwt, &token).ok_or_else(AppError::unauthenticated)?;

        AuthUser::resolve(state, claims)
            .await?
            .ok_or_else(AppError::unauthenticated)
    }
}

/// Authenticated when a valid token is present, anonymous otherwise.
pub struct OptionalAuth(pub Option<AuthUser>);

impl OptionalAuth {
    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(|auth| auth.user.id)
    }
}

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts, state).await else {
            return Ok(OptionalAuth(None));
        };

        let Some(claims) = verify_token(&state.config.jwt, &token) else {
            return Ok(OptionalAuth(None));
        };

        Ok(OptionalAuth(AuthUser::resolve(state, claims).await?))
    }
}

pub struct AdminUser(pub AuthUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;

        if !auth.user.is_admin {
            tracing::warn!(user_id = auth.user.id, "non-admin user attempted admin route");
            return Err(AppError::forbidden("Forbidden. Admin access required."));
        }

        Ok(AdminUser(auth))
    }
}

/// Rejects callers that already carry a live token.
pub struct Guest;

impl FromRequestParts<AppState> for Guest {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let OptionalAuth(auth) = OptionalAuth::from_request_parts(parts, state).await?;

        match auth {
            Some(_) => Err(AppError::forbidden("Already authenticated.")),
            None => Ok(Guest),
        }
    }
}

/// A token that may have expired, as long as it is still inside the refresh
/// window and its access row was not revoked.
pub struct RefreshAuth(pub AuthUser);

impl FromRequestParts<AppState> for RefreshAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts, state)
            .await
            .ok_or_else(AppError::unauthenticated)?;

        let claims = verify_refreshable_token(&state.config.jwt, &token)
            .ok_or_else(AppError::unauthenticated)?;

        AuthUser::resolve(state, claims)
            .await?
            .map(RefreshAuth)
            .ok_or_else(AppError::unauthenticated)
    }
}
