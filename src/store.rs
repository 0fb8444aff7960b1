// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory user store.
//!
//! Holds account records for signup, login and the admin user list. The
//! authentication path never reads from here: roles travel in the token.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::Role;
use crate::models::{normalize_email, UserRecord};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("an account with email {0} already exists")]
    DuplicateEmail(String),
}

#[derive(Default)]
pub struct UserStore {
    /// Keyed by normalized email
    users: HashMap<String, UserRecord>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_user(
        &mut self,
        email: &str,
        name: Option<String>,
        password_hash: String,
        role: Role,
    ) -> Result<UserRecord, StoreError> {
        let email = normalize_email(email);
        if self.users.contains_key(&email) {
            return Err(StoreError::DuplicateEmail(email));
        }

        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            email: email.clone(),
            name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            password_hash,
            role,
            created_at: Utc::now(),
        };
        self.users.insert(email, record.clone());
        Ok(record)
    }

    pub fn find_by_email(&self, email: &str) -> Option<&UserRecord> {
        self.users.get(&normalize_email(email))
    }

    pub fn find_by_id(&self, id: &str) -> Option<&UserRecord> {
        self.users.values().find(|user| user.id == id)
    }

    /// All users, oldest first.
    pub fn list(&self) -> Vec<&UserRecord> {
        let mut users: Vec<&UserRecord> = self.users.values().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.email.cmp(&b.email)));
        users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
