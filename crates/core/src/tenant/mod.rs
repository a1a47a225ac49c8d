//! Tenant module
//!
//! A Tenant is one customer organization. The store owns the collection
//! and enforces identity and subdomain uniqueness.

mod backend;
mod model;
mod seed;
mod store;

pub use backend::{JsonFileBackend, MemoryBackend, SeededBackend, TenantBackend};
pub use model::*;
pub use seed::demo_tenants;
pub use store::{TenantStore, DEFAULT_SAVE_TIMEOUT};
