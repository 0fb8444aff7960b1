// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only API endpoints for the storefront dashboard.
//!
//! These endpoints require the Admin role.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{AdminOnly, Role},
    models::UserSummary,
    state::AppState,
};

/// Response for the admin user list.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserListResponse {
    /// Every account, oldest first.
    pub users: Vec<UserSummary>,
    /// Total count.
    pub total: usize,
}

/// Dashboard statistics.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStatsResponse {
    pub total_users: usize,
    pub admin_users: usize,
    /// Current timestamp.
    pub timestamp: String,
}

#[utoipa::path(
    get,
    path = "/v1/admin/users",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All accounts", body = AdminUserListResponse),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Admin role required"),
    )
)]
pub async fn list_users(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
) -> Json<AdminUserListResponse> {
    let users: Vec<UserSummary> = state
        .users
        .read()
        .await
        .list()
        .into_iter()
        .map(UserSummary::from)
        .collect();

    tracing::info!(admin_id = %admin.user_id, count = users.len(), "Admin listed users");

    Json(AdminUserListResponse {
        total: users.len(),
        users,
    })
}

#[utoipa::path(
    get,
    path = "/v1/admin/stats",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = AdminStatsResponse),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Admin role required"),
    )
)]
pub async fn get_stats(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Json<AdminStatsResponse> {
    let users = state.users.read().await;
    let admin_users = users
        .list()
        .into_iter()
        .filter(|user| user.role == Role::Admin)
        .count();

    Json(AdminStatsResponse {
        total_users: users.len(),
        admin_users,
        timestamp: Utc::now().to_rfc3339(),
    })
}
