//! Account registration and login.

use crate::{
    error::{DeskError, DeskResult},
    store::DeskStore,
    types::UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two registered roles. Anonymous callers have no row in the
/// users table and therefore no `Role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

pub struct AccountService {
    store: DeskStore,
}

impl AccountService {
    pub fn new(store: DeskStore) -> Self {
        Self { store }
    }

    /// Create an account. Usernames are trimmed and must be unique.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> DeskResult<UserRecord> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DeskError::Validation {
                reason: "username must not be blank".to_string(),
            });
        }
        if password.is_empty() {
            return Err(DeskError::Validation {
                reason: "password must not be empty".to_string(),
            });
        }
        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        let user_id = self.store.insert_user(username, &password_hash, role, now)?;
        log::debug!("registered {} '{username}' as user {user_id}", role.as_str());
        Ok(UserRecord {
            user_id,
            username: username.to_string(),
            role,
            created_at: now,
        })
    }

    /// Check credentials. Unknown usernames and wrong passwords produce the
    /// same error so a caller cannot probe which usernames exist. A role
    /// claim, when supplied, must match the registered role.
    pub fn login(
        &self,
        username: &str,
        password: &str,
        role_claim: Option<Role>,
    ) -> DeskResult<UserRecord> {
        let (user, password_hash) = match self.store.user_by_username(username.trim())? {
            Some(found) => found,
            None => return Err(DeskError::InvalidCredentials),
        };
        if !bcrypt::verify(password, &password_hash)? {
            return Err(DeskError::InvalidCredentials);
        }
        if let Some(claimed) = role_claim {
            if claimed != user.role {
                return Err(DeskError::RoleMismatch {
                    username: user.username,
                    claimed: claimed.as_str().to_string(),
                });
            }
        }
        Ok(user)
    }

    /// Make sure an admin account with this username exists, creating it on
    /// first run. A same-named non-admin account is reported as a duplicate
    /// rather than silently promoted.
    pub fn ensure_admin(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> DeskResult<UserRecord> {
        if let Some((user, _)) = self.store.user_by_username(username.trim())? {
            if user.role == Role::Admin {
                return Ok(user);
            }
            return Err(DeskError::DuplicateUsername {
                username: user.username,
            });
        }
        let user = self.register(username, password, Role::Admin, now)?;
        log::info!("bootstrapped admin account '{}'", user.username);
        Ok(user)
    }
}
