//! Shared domain types for the Globus Connect Server CLI.
//!
//! This crate contains the types passed between the credential-store
//! components: tokens, encrypted records and envelopes, data keys,
//! redacted secrets, CLI configuration, and their error types.
//!
//! Zero I/O -- only serde, chrono, thiserror, base64 and secret wrappers.

pub mod config;
pub mod envelope;
pub mod error;
pub mod key;
pub mod secret;
pub mod token;
