//! # dataorch-client
//!
//! One request interface over the two DataOrchestrator backends:
//!
//! - **data_platform**: the data / workflow service (`/api/...` paths)
//! - **opencode_agent**: the agent / chat service, which also hosts sessions,
//!   skills and file uploads
//!
//! Either backend can be switched to mock mode, in which fixture-backed
//! operations answer from canned data after a short artificial delay instead
//! of going over the network.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dataorch_client::{ApiClientBuilder, BackendId, MemoryStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> dataorch_client::Result<()> {
//!     let clients = ApiClientBuilder::new()
//!         .store(Arc::new(MemoryStore::new()))
//!         .mock_mode(BackendId::DataPlatform, true)
//!         .build_all()?;
//!
//!     clients.opencode_agent.login("ana@example.com", "secret")?;
//!     let reply = clients.opencode_agent.chat("hello", None, None).await?;
//!     let report = clients
//!         .data_platform
//!         .run_workflow("revenue by product", "2025-01-20", Default::default())
//!         .await?;
//!     println!("{reply}\n{report}");
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`backend`] | Backend identifiers, registry, base URL resolution |
//! | [`store`] | Persisted state: key/value stores and the credential store |
//! | [`transport`] | `Transport` trait and the live HTTP request executor |
//! | [`mock`] | Fixture-backed mock transport |
//! | [`client`] | `ApiClient` and the domain operations |

pub mod backend;
pub mod client;
pub mod mock;
pub mod store;
pub mod transport;

pub use backend::{BackendDescriptor, BackendId, BackendRegistry};
pub use client::{Agent, ApiClient, ApiClientBuilder, BackendClients, ChatReply, UploadedFile};
pub use mock::MockTransport;
pub use store::{
    Credential, CredentialStore, FileStore, KeyValueStore, MemoryStore, UserProfile,
};
pub use transport::{LiveTransport, RequestEnvelope, Transport, UploadFile};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, ErrorKind};
