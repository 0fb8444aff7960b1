// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{Auth, Identity, Role};
use crate::models::UserSummary;
use crate::state::AppState;

/// Response for GET /v1/users/me
#[derive(Debug, Serialize, ToSchema)]
pub struct UserMeResponse {
    /// User's unique ID (token subject)
    pub user_id: String,
    /// Role carried by the session token
    pub role: Role,
    /// Stored profile, if the account still exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserSummary>,
}

impl From<Identity> for UserMeResponse {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id,
            role: identity.role,
            profile: None,
        }
    }
}

/// Get the current signed-in user's information.
///
/// The role reported is the one in the token, even if the stored account
/// has changed since the token was issued.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User information", body = UserMeResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn get_current_user(
    Auth(identity): Auth,
    State(state): State<AppState>,
) -> Json<UserMeResponse> {
    let profile = state
        .users
        .read()
        .await
        .find_by_id(&identity.user_id)
        .map(UserSummary::from);

    Json(UserMeResponse {
        profile,
        ..UserMeResponse::from(identity)
    })
}
