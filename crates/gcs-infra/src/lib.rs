//! Infrastructure layer for the Globus Connect Server CLI.
//!
//! Contains implementations of the ports defined in `gcs-core`: OS keychain
//! access, data-key management, AES-256-GCM sealing, the encrypted per-profile
//! token files, the secure-input reader, the OAuth2 refresh client, and
//! config-root resolution.

pub mod auth;
pub mod config;
pub mod crypto;
pub mod input;
pub mod keychain;
pub mod token;
