// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request authentication and Axum extractors.
//!
//! Use the `Auth` extractor in handlers to require a signed-in caller:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(identity): Auth) -> impl IntoResponse {
//!     // identity is Identity
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};

use super::{AuthError, Identity, TokenService};
use crate::state::AppState;

/// Resolves the caller of a request from its credentials.
///
/// Credentials are looked up in order:
///
/// 1. `Authorization: Bearer <token>`
/// 2. the auth cookie (default name `auth_token`)
#[derive(Clone)]
pub struct Authenticator {
    tokens: Arc<TokenService>,
    cookie_name: String,
}

impl Authenticator {
    pub fn new(tokens: Arc<TokenService>, cookie_name: impl Into<String>) -> Self {
        Self {
            tokens,
            cookie_name: cookie_name.into(),
        }
    }

    /// Find the raw session token, if the request carries one.
    pub fn credential<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        bearer_token(headers).or_else(|| cookie_value(headers, &self.cookie_name))
    }

    /// Resolve the caller, keeping "no credential" (`Ok(None)`) apart from
    /// "bad credential" (`Err`).
    pub fn resolve(&self, headers: &HeaderMap) -> Result<Option<Identity>, AuthError> {
        match self.credential(headers) {
            Some(token) => self.tokens.verify(token).map(Some),
            None => Ok(None),
        }
    }

    /// Resolve the caller; a missing or invalid credential both mean
    /// anonymous.
    ///
    /// Rejected credentials are logged so forged or stale tokens still leave
    /// a trace.
    pub fn authenticate(&self, headers: &HeaderMap) -> Option<Identity> {
        match self.resolve(headers) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error_code = e.error_code(), "Rejected session credential");
                None
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(AUTHORIZATION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| {
            let (scheme, token) = value.trim().split_once(' ')?;
            let token = token.trim();
            (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
        })
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| key.trim() == name && !value.trim().is_empty())
        .map(|(_, value)| value.trim().trim_matches('"'))
}

/// Extractor for signed-in callers.
///
/// Rejects with 401 when the request carries no valid credential.
///
/// # Example
///
/// ```rust,ignore
/// async fn view_cart(
///     Auth(identity): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<Cart>, ApiError> {
///     // identity.user_id contains the caller's ID
/// }
/// ```
pub struct Auth(pub Identity);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // First check if middleware already resolved the caller
        if let Some(identity) = parts.extensions.get::<Identity>().cloned() {
            return Ok(Auth(identity));
        }

        state
            .authenticator
            .resolve(&parts.headers)?
            .map(Auth)
            .ok_or(AuthError::MissingCredentials)
    }
}

/// Extractor that requires admin role.
pub struct AdminOnly(pub Identity);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(identity) = Auth::from_request_parts(parts, state).await?;

        if !identity.is_admin() {
            tracing::debug!(user_id = %identity.user_id, "Admin endpoint refused");
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(identity))
    }
}

/// Optional authentication extractor.
///
/// Yields `None` for anonymous callers instead of rejecting.
pub struct OptionalAuth(pub Option<Identity>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>().cloned() {
            return Ok(OptionalAuth(Some(identity)));
        }
        Ok(OptionalAuth(state.authenticator.authenticate(&parts.headers)))
    }
}
