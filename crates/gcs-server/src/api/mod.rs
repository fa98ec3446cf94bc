//! API routes for the ground control server.

mod error;
mod routes;
pub mod ws;

pub use error::ApiError;

use axum::Router;

pub fn routes() -> Router<std::sync::Arc<crate::state::AppState>> {
    routes::create_router()
}

#[cfg(test)]
mod tests;
