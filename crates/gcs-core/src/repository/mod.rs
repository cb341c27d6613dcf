//! Port trait definitions.
//!
//! These traits define the storage and network interfaces that the
//! infrastructure layer (gcs-infra) implements. Tests substitute in-memory
//! implementations.

pub mod auth;
pub mod key;
pub mod secret_store;
pub mod token;
