//! Authentication operations, delegated to the credential store.

use super::core::ApiClient;
use crate::store::{LoginResponse, LogoutResponse, UserProfile};
use crate::Result;

impl ApiClient {
    /// Open-door login: always succeeds without contacting either backend.
    ///
    /// The synthesized token is attached to every later request from any
    /// client sharing the same store.
    pub fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        self.credentials.login(email, password)
    }

    pub fn logout(&self) -> Result<LogoutResponse> {
        self.credentials.logout()
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        self.credentials.is_authenticated()
    }

    pub fn current_user(&self) -> Result<Option<UserProfile>> {
        self.credentials.current_user()
    }

    pub fn token(&self) -> Result<Option<String>> {
        self.credentials.token()
    }
}
