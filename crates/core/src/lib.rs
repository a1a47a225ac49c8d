//! Core library for the Tenant Manager
//!
//! This crate contains the tenant administration model:
//! - Tenant records and their field invariants
//! - The tenant store and its CRUD contract
//! - Pluggable backends for initial state and persistence

pub mod error;
pub mod tenant;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
