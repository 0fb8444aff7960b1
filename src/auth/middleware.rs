// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access gate middleware for Axum.
//!
//! Runs the request authenticator and the access gate in front of every
//! route. Allowed requests continue with the caller's [`Identity`] in the
//! request extensions, where the extractors pick it up. Page requests that
//! are refused get a `303 See Other` redirect; requests under the API
//! prefix get the equivalent JSON `AuthError` instead.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/cart", get(view_cart))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), gate_requests))
//!     .with_state(state);
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::{AuthError, Decision};
use crate::state::AppState;

/// Authenticate the caller and enforce the route table.
pub async fn gate_requests(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = state.authenticator.authenticate(request.headers());

    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let decision = state.gate.check(&target, identity.as_ref());

    if decision.is_allowed() {
        if let Some(identity) = identity {
            request.extensions_mut().insert(identity);
        }
        return next.run(request).await;
    }

    tracing::debug!(
        path = %request.uri().path(),
        user_id = identity.as_ref().map(|i| i.user_id.as_str()),
        ?decision,
        "Access gate refused request"
    );

    if is_under_prefix(request.uri().path(), &state.settings.api_prefix) {
        return api_rejection(&decision, identity.is_some()).into_response();
    }

    match state.gate.redirect_location(&decision) {
        Some(location) => Redirect::to(&location).into_response(),
        None => AuthError::Internal("redirect without a target".to_string()).into_response(),
    }
}

fn api_rejection(decision: &Decision, authenticated: bool) -> AuthError {
    match decision {
        Decision::RedirectToHome if authenticated => AuthError::InsufficientPermissions,
        _ => AuthError::MissingCredentials,
    }
}

fn is_under_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
