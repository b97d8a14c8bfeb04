//! Persisted client-side state: auth credential and per-backend settings.
//!
//! All state sits behind the [`KeyValueStore`] trait, a string key/value
//! store with the same shape as browser local storage. Keys in use:
//!
//! | Key | Value |
//! |-----|-------|
//! | `token` | bearer token issued by [`CredentialStore::login`] |
//! | `user` | JSON user profile (`{"email": ...}`) |
//! | `dataPlatformUrl` | base URL override for the data platform |
//! | `opencodeAgentUrl` | base URL override for the agent service |

mod backend;
mod credentials;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use credentials::{Credential, CredentialStore, LoginResponse, LogoutResponse, UserProfile};

pub(crate) const TOKEN_KEY: &str = "token";
pub(crate) const USER_KEY: &str = "user";
