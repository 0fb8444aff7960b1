// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! configuration objects built from them. Configuration is loaded from the
//! environment once at startup and handed to the components that need it;
//! nothing reads the environment after that.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HS256 signing secret for session tokens | built-in fallback (warns) |
//! | `TOKEN_TTL_DAYS` | Session token lifetime in days | `7` |
//! | `AUTH_COOKIE_NAME` | Cookie holding the session token | `auth_token` |
//! | `ROLE_COOKIE_NAME` | Cookie holding the role hint for the frontend | `user_role` |
//! | `COOKIE_SECURE` | Mark session cookies `Secure` (`true` or `false`) | `true` |
//! | `SEED_ADMIN_EMAIL` | Admin account created at startup | unset |
//! | `SEED_ADMIN_PASSWORD` | Password for the seeded admin | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;

use chrono::Duration;

use crate::auth::gate::RouteTable;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const TOKEN_TTL_DAYS_ENV: &str = "TOKEN_TTL_DAYS";
pub const AUTH_COOKIE_NAME_ENV: &str = "AUTH_COOKIE_NAME";
pub const ROLE_COOKIE_NAME_ENV: &str = "ROLE_COOKIE_NAME";
pub const COOKIE_SECURE_ENV: &str = "COOKIE_SECURE";
pub const SEED_ADMIN_EMAIL_ENV: &str = "SEED_ADMIN_EMAIL";
pub const SEED_ADMIN_PASSWORD_ENV: &str = "SEED_ADMIN_PASSWORD";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;
pub const DEFAULT_AUTH_COOKIE: &str = "auth_token";
pub const DEFAULT_ROLE_COOKIE: &str = "user_role";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Signing secret used when `JWT_SECRET` is not set.
///
/// Anyone who knows this value can mint admin tokens. Startup logs a
/// warning whenever it is in use.
pub const FALLBACK_JWT_SECRET: &str = "greenhouse-development-secret-change-me";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("invalid bind address {0}")]
    InvalidBindAddress(String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Settings shared by the token service, request authenticator and access
/// gate.
#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    /// True when `jwt_secret` is [`FALLBACK_JWT_SECRET`].
    pub using_fallback_secret: bool,
    pub token_ttl: Duration,
    pub auth_cookie: String,
    pub role_cookie: String,
    /// Adds `Secure` to session cookies. Disable only for plain-HTTP dev.
    pub secure_cookies: bool,
    pub routes: RouteTable,
    pub login_path: String,
    pub signup_path: String,
    pub home_path: String,
    pub profile_path: String,
    /// Requests under this prefix get JSON 401/403 instead of redirects.
    pub api_prefix: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: FALLBACK_JWT_SECRET.to_string(),
            using_fallback_secret: true,
            token_ttl: Duration::days(DEFAULT_TOKEN_TTL_DAYS),
            auth_cookie: DEFAULT_AUTH_COOKIE.to_string(),
            role_cookie: DEFAULT_ROLE_COOKIE.to_string(),
            secure_cookies: true,
            routes: RouteTable::storefront(),
            login_path: "/login".to_string(),
            signup_path: "/signup".to_string(),
            home_path: "/".to_string(),
            profile_path: "/profile".to_string(),
            api_prefix: "/v1".to_string(),
        }
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"<redacted>")
            .field("using_fallback_secret", &self.using_fallback_secret)
            .field("token_ttl", &self.token_ttl)
            .field("auth_cookie", &self.auth_cookie)
            .field("role_cookie", &self.role_cookie)
            .field("secure_cookies", &self.secure_cookies)
            .field("routes", &self.routes.rule_count())
            .field("api_prefix", &self.api_prefix)
            .finish()
    }
}

/// Admin account to create at startup.
#[derive(Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub auth: AuthSettings,
    pub seed_admin: Option<SeedAdmin>,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match get(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: PORT_ENV,
                expected: "a port number",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let log_format = match get(LOG_FORMAT_ENV).map(|v| v.trim().to_lowercase()) {
            None => LogFormat::Pretty,
            Some(v) if v == "pretty" => LogFormat::Pretty,
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) => {
                return Err(ConfigError::InvalidValue {
                    name: LOG_FORMAT_ENV,
                    expected: "`json` or `pretty`",
                    value: v,
                })
            }
        };

        let token_ttl = match get(TOKEN_TTL_DAYS_ENV) {
            Some(raw) => match raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|days| (1..=MAX_TOKEN_TTL_DAYS).contains(days))
                .and_then(Duration::try_days)
            {
                Some(ttl) => ttl,
                None => {
                    return Err(ConfigError::InvalidValue {
                        name: TOKEN_TTL_DAYS_ENV,
                        expected: "a number of days between 1 and 3650",
                        value: raw,
                    })
                }
            },
            None => Duration::days(DEFAULT_TOKEN_TTL_DAYS),
        };

        let secure_cookies = match get(COOKIE_SECURE_ENV).map(|v| v.trim().to_lowercase()) {
            None => true,
            Some(v) if v == "true" || v == "1" => true,
            Some(v) if v == "false" || v == "0" => false,
            Some(v) => {
                return Err(ConfigError::InvalidValue {
                    name: COOKIE_SECURE_ENV,
                    expected: "`true` or `false`",
                    value: v,
                })
            }
        };

        let (jwt_secret, using_fallback_secret) = match get(JWT_SECRET_ENV) {
            Some(secret) => (secret, false),
            None => (FALLBACK_JWT_SECRET.to_string(), true),
        };

        let seed_admin = match (get(SEED_ADMIN_EMAIL_ENV), get(SEED_ADMIN_PASSWORD_ENV)) {
            (Some(email), Some(password)) => Some(SeedAdmin { email, password }),
            _ => None,
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            log_format,
            auth: AuthSettings {
                jwt_secret,
                using_fallback_secret,
                token_ttl,
                auth_cookie: get(AUTH_COOKIE_NAME_ENV)
                    .unwrap_or_else(|| DEFAULT_AUTH_COOKIE.to_string()),
                role_cookie: get(ROLE_COOKIE_NAME_ENV)
                    .unwrap_or_else(|| DEFAULT_ROLE_COOKIE.to_string()),
                secure_cookies,
                ..AuthSettings::default()
            },
            seed_admin,
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::InvalidBindAddress(raw))
    }
}
