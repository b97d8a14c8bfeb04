//! Per-backend API client and its domain operations.
//!
//! Each [`ApiClient`] is bound to one backend and holds one transport, chosen
//! once at construction from the backend's mock flag. Operations are split by
//! domain into submodules under `src/client/`.

mod auth;
pub mod builder;
mod chat;
pub mod core;
mod files;
mod sessions;
mod skills;
pub mod types;
mod workflow;

pub use builder::{ApiClientBuilder, BackendClients};
pub use core::ApiClient;
pub use types::{Agent, ChatReply, ChatRequest, MessagePart, SkillExecuteRequest, UploadedFile};
