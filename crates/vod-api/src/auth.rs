//! Bearer token authentication.
//!
//! Tokens are HS256 JWTs minted by the identity provider; `sub` is the
//! durable user id, `handle`/`name`/`picture` mirror the profile. The
//! extractors make the caller explicit on every handler that needs
//! one: nothing downstream reads auth out of ambient state.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use vod_models::{User, UserId};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: usize,
    #[serde(default)]
    handle: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub handle: Option<String>,
    pub display_name: Option<String>,
    pub image_url: Option<String>,
}

impl AuthUser {
    /// Materialize a profile record from the token claims, for the
    /// lazy upsert on content-creating endpoints.
    pub fn to_profile(&self) -> User {
        let handle = self
            .handle
            .clone()
            .unwrap_or_else(|| self.user_id.as_str().to_string());
        let display_name = self.display_name.clone().unwrap_or_else(|| handle.clone());
        let mut user = User::new(self.user_id.clone(), handle, display_name);
        user.image_url = self.image_url.clone();
        user
    }
}

fn decode_bearer(parts: &Parts, secret: &str) -> Result<AuthUser, ApiError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing Authorization header"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("expected Bearer token"))?;

    let key = DecodingKey::from_secret(secret.as_bytes());
    let data = decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256))
        .map_err(|e| ApiError::unauthorized(format!("invalid token: {e}")))?;

    Ok(AuthUser {
        user_id: UserId::from_string(data.claims.sub),
        handle: data.claims.handle,
        display_name: data.claims.name,
        image_url: data.claims.picture,
    })
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        decode_bearer(parts, &state.config.jwt_secret)
    }
}

/// Optional caller: `None` when no Authorization header is present,
/// but a present-and-invalid token is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !parts
            .headers
            .contains_key(axum::http::header::AUTHORIZATION)
        {
            return Ok(MaybeAuthUser(None));
        }
        decode_bearer(parts, &state.config.jwt_secret).map(|user| MaybeAuthUser(Some(user)))
    }
}

#[cfg(test)]
pub mod test_tokens {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        exp: usize,
        handle: &'a str,
        name: &'a str,
    }

    /// Mint a valid token for tests.
    pub fn mint(secret: &str, sub: &str, handle: &str) -> String {
        let claims = TestClaims {
            sub,
            exp: 4_102_444_800, // 2100-01-01
            handle,
            name: handle,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }
}
