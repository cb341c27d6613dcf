//! Token lifecycle logic and port trait definitions.
//!
//! This crate defines the "ports" (secret store, key provider, token
//! repository, auth client) that the infrastructure layer implements, plus
//! the token lifecycle rules built on them. It depends only on `gcs-types`
//! -- never on `gcs-infra` or any keychain/crypto/IO crate.

pub mod repository;
pub mod service;
