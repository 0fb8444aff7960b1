// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{AccessGate, Authenticator, TokenService};
use crate::config::AuthSettings;
use crate::store::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<AuthSettings>,
    pub tokens: Arc<TokenService>,
    pub authenticator: Authenticator,
    pub gate: Arc<AccessGate>,
    pub users: Arc<RwLock<UserStore>>,
}

impl AppState {
    pub fn new(settings: AuthSettings) -> Self {
        Self::with_store(settings, UserStore::new())
    }

    pub fn with_store(settings: AuthSettings, users: UserStore) -> Self {
        let tokens = Arc::new(TokenService::new(&settings));
        let authenticator = Authenticator::new(tokens.clone(), settings.auth_cookie.clone());
        let gate = Arc::new(AccessGate::new(&settings));
        Self {
            settings: Arc::new(settings),
            tokens,
            authenticator,
            gate,
            users: Arc::new(RwLock::new(users)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AuthSettings::default())
    }
}
