// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session tokens, request authentication and route gating for the
//! Greenhouse storefront.
//!
//! ## Auth Flow
//!
//! 1. Signup/login verifies the password and issues an HS256 session token
//!    carrying `(user_id, role)`, valid for 7 days
//! 2. The client sends it back as `Authorization: Bearer <token>` or in the
//!    `auth_token` cookie
//! 3. The server:
//!    - verifies signature and expiry (no server-side session table)
//!    - rebuilds the [`Identity`] from the claims
//!    - classifies the path (public / protected / admin-only) and decides
//!      allow or redirect
//!
//! ## Security
//!
//! - Roles come from the token only; the user store is not consulted per
//!   request
//! - Missing and invalid credentials both resolve to anonymous; invalid
//!   ones are logged
//! - Tokens cannot be revoked before expiry

pub mod claims;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod middleware;
pub mod password;
pub mod roles;
pub mod token;

pub use claims::{Identity, SessionClaims};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, Authenticator, OptionalAuth};
pub use gate::{AccessGate, Decision, RouteClass, RouteTable};
pub use password::{validate as validate_password, PasswordCheck};
pub use roles::Role;
pub use token::TokenService;
