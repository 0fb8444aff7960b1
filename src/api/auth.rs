// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account endpoints: signup, login, logout and the password strength check.
//!
//! Signup and login answer with the session token in the body and set two
//! cookies: the HttpOnly auth cookie the server reads back, and a readable
//! role cookie the frontend uses to hide links. The role cookie is never
//! trusted server-side.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderName, StatusCode},
    response::AppendHeaders,
    Json,
};

use crate::{
    auth::{password, AuthError, PasswordCheck, Role},
    config::AuthSettings,
    error::ApiError,
    models::{
        is_plausible_email, AuthResponse, LoginRequest, PasswordCheckRequest, SignupRequest,
        UserRecord, UserSummary,
    },
    state::AppState,
};

type CookieHeaders = AppendHeaders<[(HeaderName, String); 2]>;

/// Validate, hash and store a new account.
pub async fn create_account(
    state: &AppState,
    email: &str,
    password_plain: &str,
    name: Option<String>,
    role: Role,
) -> Result<UserRecord, ApiError> {
    if !is_plausible_email(email.trim()) {
        return Err(ApiError::unprocessable("A valid email address is required"));
    }

    let check = password::validate(password_plain);
    if let Some(reason) = check.reason {
        return Err(ApiError::unprocessable(reason));
    }

    if state.users.read().await.find_by_email(email).is_some() {
        return Err(ApiError::conflict("An account with this email already exists"));
    }

    let plain = password_plain.to_string();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| ApiError::internal(format!("Password hashing task failed: {e}")))??;

    let record = state
        .users
        .write()
        .await
        .create_user(email, name, password_hash, role)?;

    tracing::info!(user_id = %record.id, role = %record.role, "Account created");
    Ok(record)
}

fn cookie_attributes(settings: &AuthSettings, max_age: i64) -> String {
    let secure = if settings.secure_cookies { "; Secure" } else { "" };
    format!("Path=/; SameSite=Lax; Max-Age={max_age}{secure}")
}

fn session_cookies(settings: &AuthSettings, token: &str, role: Role) -> CookieHeaders {
    let attributes = cookie_attributes(settings, settings.token_ttl.num_seconds());
    AppendHeaders([
        (
            SET_COOKIE,
            format!("{}={token}; HttpOnly; {attributes}", settings.auth_cookie),
        ),
        (SET_COOKIE, format!("{}={role}; {attributes}", settings.role_cookie)),
    ])
}

fn cleared_cookies(settings: &AuthSettings) -> CookieHeaders {
    let attributes = cookie_attributes(settings, 0);
    AppendHeaders([
        (
            SET_COOKIE,
            format!("{}=; HttpOnly; {attributes}", settings.auth_cookie),
        ),
        (SET_COOKIE, format!("{}=; {attributes}", settings.role_cookie)),
    ])
}

fn start_session(
    state: &AppState,
    record: &UserRecord,
) -> Result<(CookieHeaders, Json<AuthResponse>), ApiError> {
    let token = state.tokens.issue(&record.id, record.role)?;
    let cookies = session_cookies(&state.settings, &token, record.role);
    Ok((
        cookies,
        Json(AuthResponse {
            token,
            expires_in: state.tokens.ttl().num_seconds(),
            user: UserSummary::from(record),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/v1/auth/signup",
    request_body = SignupRequest,
    tag = "Auth",
    responses(
        (status = 201, description = "Account created and signed in", body = AuthResponse),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Invalid email or weak password"),
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, CookieHeaders, Json<AuthResponse>), ApiError> {
    let record = create_account(
        &state,
        &request.email,
        &request.password,
        request.name,
        Role::User,
    )
    .await?;

    let (cookies, body) = start_session(&state, &record)?;
    Ok((StatusCode::CREATED, cookies, body))
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid email or password"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieHeaders, Json<AuthResponse>), ApiError> {
    let record = state
        .users
        .read()
        .await
        .find_by_email(&request.email)
        .cloned();

    let hash = record.as_ref().map(|r| r.password_hash.clone());
    let plain = request.password;
    let matches =
        tokio::task::spawn_blocking(move || password::verify_login(&plain, hash.as_deref()))
            .await
            .map_err(|e| ApiError::internal(format!("Password check task failed: {e}")))?;

    let record = match record {
        Some(record) if matches => record,
        Some(record) => {
            tracing::info!(user_id = %record.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }
        None => {
            tracing::info!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    tracing::info!(user_id = %record.id, role = %record.role, "Signed in");
    start_session(&state, &record)
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    responses((status = 204, description = "Session cookies cleared"))
)]
pub async fn logout(State(state): State<AppState>) -> (StatusCode, CookieHeaders) {
    (StatusCode::NO_CONTENT, cleared_cookies(&state.settings))
}

#[utoipa::path(
    post,
    path = "/v1/auth/password/check",
    request_body = PasswordCheckRequest,
    tag = "Auth",
    responses((status = 200, description = "Strength check result", body = PasswordCheck))
)]
pub async fn check_password(Json(request): Json<PasswordCheckRequest>) -> Json<PasswordCheck> {
    Json(password::validate(&request.password))
}
