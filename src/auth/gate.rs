// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route classification and the access decision table.
//!
//! ## Decision Table
//!
//! | Route class | Identity | Role | Decision |
//! |-------------|----------|------|----------|
//! | `Public` | any | any | `Allow` |
//! | `Protected` | absent | - | `RedirectToLogin` (with callback) |
//! | `Protected` | present | any | `Allow` |
//! | `AdminOnly` | absent | - | `RedirectToHome` |
//! | `AdminOnly` | present | `User` | `RedirectToHome` |
//! | `AdminOnly` | present | `Admin` | `Allow` |
//!
//! An authenticated caller asking for the login or signup page is sent to
//! the profile page before the table applies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Identity;
use crate::config::AuthSettings;

/// Query parameter carrying the originally requested path on login redirects.
pub const CALLBACK_PARAM: &str = "callbackUrl";

/// Access class of a path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RouteClass {
    /// Anyone, signed in or not
    Public,
    /// Any signed-in account
    Protected,
    /// Admin accounts only
    AdminOnly,
}

/// Static path-prefix table, matched longest prefix first.
///
/// Prefixes match whole path segments: `/admin` covers `/admin` and
/// `/admin/users` but not `/administrator`. The root entry `/` only matches
/// the root path itself. Anything unmatched is [`RouteClass::Protected`].
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<(String, RouteClass)>,
}

impl RouteTable {
    /// Empty table; every path classifies as `Protected`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storefront defaults.
    pub fn storefront() -> Self {
        let mut table = Self::new();
        for prefix in [
            "/", "/login", "/signup", "/plants", "/search", "/identify", "/nurseries",
            "/videos", "/about", "/health", "/docs", "/api-doc", "/v1/auth",
        ] {
            table = table.with(prefix, RouteClass::Public);
        }
        for prefix in ["/cart", "/profile", "/checkout", "/orders", "/v1/users"] {
            table = table.with(prefix, RouteClass::Protected);
        }
        for prefix in ["/admin", "/v1/admin"] {
            table = table.with(prefix, RouteClass::AdminOnly);
        }
        table
    }

    /// Add or replace an entry.
    pub fn with(mut self, prefix: impl Into<String>, class: RouteClass) -> Self {
        let prefix = normalize_prefix(&prefix.into());
        self.entries.retain(|(existing, _)| *existing != prefix);
        self.entries.push((prefix, class));
        self.entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        self
    }

    /// Number of prefix rules.
    pub fn rule_count(&self) -> usize {
        self.entries.len()
    }

    /// Classify a request path (without query string).
    pub fn classify(&self, path: &str) -> RouteClass {
        self.entries
            .iter()
            .find(|(prefix, _)| prefix_matches(prefix, path))
            .map(|(_, class)| *class)
            .unwrap_or(RouteClass::Protected)
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim();
    let with_slash = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };
    if with_slash.len() > 1 {
        with_slash.trim_end_matches('/').to_string()
    } else {
        with_slash
    }
}

fn prefix_matches(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return path == "/" || path.is_empty();
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    /// Send to the login page; `callback` is the originally requested target.
    RedirectToLogin { callback: String },
    RedirectToHome,
    RedirectToProfile,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decides whether a caller may reach a route.
///
/// Built once from [`AuthSettings`] and shared read-only.
#[derive(Debug, Clone)]
pub struct AccessGate {
    routes: RouteTable,
    login_path: String,
    signup_path: String,
    home_path: String,
    profile_path: String,
}

impl AccessGate {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            routes: settings.routes.clone(),
            login_path: settings.login_path.clone(),
            signup_path: settings.signup_path.clone(),
            home_path: settings.home_path.clone(),
            profile_path: settings.profile_path.clone(),
        }
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        self.routes.classify(path)
    }

    /// Apply the decision table.
    ///
    /// `target` is the requested path, optionally with its query string; it
    /// becomes the login callback.
    pub fn authorize(
        &self,
        class: RouteClass,
        target: &str,
        identity: Option<&Identity>,
    ) -> Decision {
        if identity.is_some() && self.is_auth_page(path_of(target)) {
            return Decision::RedirectToProfile;
        }

        match (class, identity) {
            (RouteClass::Public, _) => Decision::Allow,
            (RouteClass::Protected, None) => Decision::RedirectToLogin {
                callback: target.to_string(),
            },
            (RouteClass::Protected, Some(_)) => Decision::Allow,
            (RouteClass::AdminOnly, Some(identity)) if identity.is_admin() => Decision::Allow,
            (RouteClass::AdminOnly, _) => Decision::RedirectToHome,
        }
    }

    /// Classify `target` and apply the decision table.
    pub fn check(&self, target: &str, identity: Option<&Identity>) -> Decision {
        let class = self.classify(path_of(target));
        self.authorize(class, target, identity)
    }

    /// Location header value for a redirect decision.
    pub fn redirect_location(&self, decision: &Decision) -> Option<String> {
        match decision {
            Decision::Allow => None,
            Decision::RedirectToLogin { callback } => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(callback.as_bytes()).collect();
                Some(format!("{}?{CALLBACK_PARAM}={encoded}", self.login_path))
            }
            Decision::RedirectToHome => Some(self.home_path.clone()),
            Decision::RedirectToProfile => Some(self.profile_path.clone()),
        }
    }

    fn is_auth_page(&self, path: &str) -> bool {
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        path == self.login_path || path == self.signup_path
    }
}

fn path_of(target: &str) -> &str {
    target.split_once('?').map_or(target, |(path, _)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn gate() -> AccessGate {
        AccessGate::new(&AuthSettings::default())
    }

    fn user() -> Identity {
        Identity::new("user-1", Role::User)
    }

    fn admin() -> Identity {
        Identity::new("admin-1", Role::Admin)
    }

    #[test]
    fn public_routes_allow_everyone() {
        let gate = gate();
        for identity in [None, Some(user()), Some(admin())] {
            assert_eq!(
                gate.authorize(RouteClass::Public, "/plants/monstera", identity.as_ref()),
                Decision::Allow
            );
        }
    }

    #[test]
    fn protected_routes_redirect_anonymous_to_login() {
        let gate = gate();
        let decision = gate.authorize(RouteClass::Protected, "/cart", None);
        assert_eq!(
            decision,
            Decision::RedirectToLogin {
                callback: "/cart".to_string()
            }
        );
        assert_eq!(
            gate.redirect_location(&decision).as_deref(),
            Some("/login?callbackUrl=%2Fcart")
        );
    }

    #[test]
    fn login_callback_keeps_query_string() {
        let gate = gate();
        let decision = gate.check("/checkout?step=2&coupon=fern", None);
        let location = gate.redirect_location(&decision).unwrap();
        assert_eq!(
            location,
            "/login?callbackUrl=%2Fcheckout%3Fstep%3D2%26coupon%3Dfern"
        );
    }

    #[test]
    fn protected_routes_allow_any_signed_in_role() {
        let gate = gate();
        assert!(gate.authorize(RouteClass::Protected, "/cart", Some(&user())).is_allowed());
        assert!(gate.authorize(RouteClass::Protected, "/cart", Some(&admin())).is_allowed());
    }

    #[test]
    fn admin_routes_require_admin() {
        let gate = gate();
        assert_eq!(
            gate.authorize(RouteClass::AdminOnly, "/admin", None),
            Decision::RedirectToHome
        );
        assert_eq!(
            gate.authorize(RouteClass::AdminOnly, "/admin", Some(&user())),
            Decision::RedirectToHome
        );
        assert_eq!(
            gate.authorize(RouteClass::AdminOnly, "/admin", Some(&admin())),
            Decision::Allow
        );
        assert_eq!(
            gate.redirect_location(&Decision::RedirectToHome).as_deref(),
            Some("/")
        );
    }

    #[test]
    fn signed_in_users_are_kept_off_auth_pages() {
        let gate = gate();
        for path in ["/login", "/signup", "/login/", "/login?callbackUrl=%2Fcart"] {
            assert_eq!(gate.check(path, Some(&user())), Decision::RedirectToProfile, "{path}");
        }
        assert_eq!(gate.check("/login", None), Decision::Allow);
        assert_eq!(
            gate.redirect_location(&Decision::RedirectToProfile).as_deref(),
            Some("/profile")
        );
    }

    #[test]
    fn longest_prefix_wins() {
        let table = RouteTable::new()
            .with("/shop", RouteClass::Public)
            .with("/shop/orders", RouteClass::Protected)
            .with("/shop/orders/export", RouteClass::AdminOnly);

        assert_eq!(table.classify("/shop/ferns"), RouteClass::Public);
        assert_eq!(table.classify("/shop/orders/17"), RouteClass::Protected);
        assert_eq!(table.classify("/shop/orders/export"), RouteClass::AdminOnly);
        assert_eq!(table.classify("/shop/orders/export/csv"), RouteClass::AdminOnly);
    }

    #[test]
    fn prefixes_match_whole_segments() {
        let table = RouteTable::storefront();
        assert_eq!(table.classify("/admin"), RouteClass::AdminOnly);
        assert_eq!(table.classify("/admin/users"), RouteClass::AdminOnly);
        assert_eq!(table.classify("/administrator"), RouteClass::Protected);
    }

    #[test]
    fn root_entry_only_matches_root() {
        let table = RouteTable::storefront();
        assert_eq!(table.classify("/"), RouteClass::Public);
        assert_eq!(table.classify("/wishlist"), RouteClass::Protected);
    }

    #[test]
    fn unmatched_paths_default_to_protected() {
        assert_eq!(RouteTable::new().classify("/anything"), RouteClass::Protected);
        assert_eq!(RouteTable::new().classify("/"), RouteClass::Protected);
    }

    #[test]
    fn with_replaces_existing_prefix() {
        let table = RouteTable::new()
            .with("/videos/", RouteClass::Public)
            .with("videos", RouteClass::AdminOnly);
        assert_eq!(table.rule_count(), 1);
        assert_eq!(table.classify("/videos/fern-care"), RouteClass::AdminOnly);
    }

    #[test]
    fn storefront_table_classifies_api_paths() {
        let table = RouteTable::storefront();
        assert_eq!(table.classify("/v1/auth/login"), RouteClass::Public);
        assert_eq!(table.classify("/v1/users/me"), RouteClass::Protected);
        assert_eq!(table.classify("/v1/admin/users"), RouteClass::AdminOnly);
    }
}
