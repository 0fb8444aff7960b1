// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Greenhouse - Plant Storefront Authentication & Access Service
//!
//! This crate provides session tokens, request authentication and
//! role/route gating for the Greenhouse plant identification storefront.
//! Cart, search and the third-party plant integrations are served behind
//! the access gate by their own handlers.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token service, request authenticator, access gate, password rules
//! - `config` - Environment configuration
//! - `store` - In-memory account records

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod store;
