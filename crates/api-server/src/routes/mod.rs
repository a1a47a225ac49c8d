//! Route handlers

pub mod health;
pub mod tenants;

use axum::{middleware, Router};

use crate::error::{error_envelope, route_not_found};
use crate::state::AppState;

/// Assemble the REST application
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(tenants::router())
        .fallback(route_not_found)
        .with_state(state)
        .layer(middleware::from_fn(error_envelope))
}
