//! Credential store.
//!
//! Login is an open door: no server is contacted and any email/password pair
//! succeeds with a locally synthesized token. This is a placeholder for a real
//! credential exchange, not a security boundary. Backends must not treat the
//! token as proof of identity.

use super::{KeyValueStore, TOKEN_KEY, USER_KEY};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Owner of the persisted `{token, user}` pair. Cheap to clone.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The underlying key/value store (also holds base URL overrides).
    pub fn backing_store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Always succeeds; the password is not checked.
    pub fn login(&self, email: &str, _password: &str) -> Result<LoginResponse> {
        let token = format!("mock_token_{}", unix_millis());
        let user = UserProfile {
            email: email.to_string(),
        };
        let user_json = serde_json::to_string(&user)?;
        self.store.set(TOKEN_KEY, &token)?;
        if let Err(e) = self.store.set(USER_KEY, &user_json) {
            // Token and user are stored together or not at all.
            if let Err(cleanup) = self.store.remove(TOKEN_KEY) {
                warn!(error = %cleanup, store = self.store.name(), "failed to roll back token");
            }
            return Err(e);
        }
        info!(email = %user.email, store = self.store.name(), "logged in");
        Ok(LoginResponse {
            success: true,
            token,
            user,
        })
    }

    pub fn logout(&self) -> Result<LogoutResponse> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        info!(store = self.store.name(), "logged out");
        Ok(LogoutResponse { success: true })
    }

    /// Current bearer token. An empty stored token counts as absent.
    pub fn token(&self) -> Result<Option<String>> {
        Ok(self.store.get(TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.token()?.is_some())
    }

    pub fn current_user(&self) -> Result<Option<UserProfile>> {
        match self.store.get(USER_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn credential(&self) -> Result<Option<Credential>> {
        let Some(token) = self.token()? else {
            return Ok(None);
        };
        Ok(self
            .current_user()?
            .map(|user| Credential { token, user }))
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("store", &self.store.name())
            .finish()
    }
}
