use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    session::{Session, SessionUser},
};

/// Header carrying comma-separated roles for the local development session.
pub const DEV_ROLES_HEADER: &str = "x-dev-roles";
/// Token recorded on sessions created through the development bypass.
pub const DEV_SESSION_TOKEN: &str = "local-dev-session";

/// Claims
///
/// Payload of a session token. The roles are signed into the token, so the token and
/// the role list a request is judged on always come from the same login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's UUID.
    pub sub: Uuid,
    /// Roles granted at login, e.g. `["observer", "admin"]`.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Expiration Time (exp): seconds since the epoch.
    pub exp: usize,
    /// Issued At (iat): seconds since the epoch.
    pub iat: usize,
}

impl Claims {
    pub fn new(sub: Uuid, roles: Vec<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub,
            roles,
            iat: now.timestamp().max(0) as usize,
            exp: (now + ttl).timestamp().max(0) as usize,
        }
    }
}

/// issue_token
///
/// Signs `claims` with the configured secret (HS256). Used by the login flow and by
/// tests that need a real bearer token.
pub fn issue_token(secret: &str, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// decode_session
///
/// Turns a raw bearer token into a session. Any validation failure (bad signature,
/// expired, malformed) yields `None`.
pub fn decode_session(secret: &str, token: &str) -> Option<Session> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    match decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation) {
        Ok(data) => Some(Session::authenticated(
            token,
            SessionUser {
                roles: data.claims.roles,
            },
        )),
        Err(e) => {
            tracing::debug!(error = %e, "Rejected session token, treating request as anonymous");
            None
        }
    }
}

/// CurrentSession Extractor
///
/// Resolves the session a page navigation is evaluated against. This never rejects:
/// public pages must stay reachable, so a missing or invalid token simply produces an
/// anonymous session and the navigation gate decides what that session may open.
///
/// Resolution order:
/// 1. Local Bypass: in `Env::Local`, an `x-dev-roles` header yields a development
///    session carrying those roles.
/// 2. Bearer Token: `Authorization: Bearer <jwt>` validated against the secret.
/// 3. Otherwise anonymous.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            if let Some(roles) = parts
                .headers
                .get(DEV_ROLES_HEADER)
                .and_then(|value| value.to_str().ok())
            {
                let user = SessionUser::with_roles(
                    roles.split(',').map(str::trim).filter(|r| !r.is_empty()),
                );
                return Ok(CurrentSession(Session::authenticated(DEV_SESSION_TOKEN, user)));
            }
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let session = token
            .and_then(|token| decode_session(&config.jwt_secret, token))
            .unwrap_or_else(Session::anonymous);

        Ok(CurrentSession(session))
    }
}
