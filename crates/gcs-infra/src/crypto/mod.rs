//! Cryptographic operations for the credential store.
//!
//! - `key_manager`: data-key lifecycle in the OS secret store, plus the
//!   passphrase-derived fallback
//! - `engine`: AES-256-GCM seal/open of token records

pub mod engine;
pub mod key_manager;
