//! Krishi HTTP presentation layer
//!
//! Call webhook, direct question API, query history, synthesized audio and
//! health endpoints.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use middleware::RequestIdLayer;
pub use routes::create_router;
pub use state::AppState;
