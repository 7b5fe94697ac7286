//! # exm-auth
//!
//! Session credentials for Examind.
//!
//! The web client kept the bearer token and the signed-in user's id in two
//! cookies. Here they live behind [`CredentialStore`]: the OS keychain with a
//! `0600` file fallback for interactive use ([`KeyringStore`]), or plain memory
//! for request-scoped prefetching and tests ([`MemoryStore`]).

pub mod error;
pub mod expiry;
pub mod store;

pub use error::CredentialError;
pub use store::{CredentialStore, KeyringStore, MemoryStore, SessionCredentials};
