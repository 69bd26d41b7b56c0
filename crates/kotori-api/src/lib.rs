//! Kotori HTTP API: webhook authorization and dispatch.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod crypto;
pub mod handlers;
pub mod middleware;
pub mod secrets;
pub mod server;

pub use config::Config;
pub use middleware::authorize::Authorizer;
pub use secrets::{CredentialCache, HttpSecretStore, SecretStore, StaticSecretStore};
pub use server::{create_router, start_server, AppState};
