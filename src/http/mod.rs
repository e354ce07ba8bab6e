//! Axum-based HTTP server for the academy API.
//!
//! - [`dto`]: Typed request/response structs per operation
//! - [`error`]: Error-to-status mapping and the API error body
//! - [`handlers`]: One handler per endpoint, delegating to services
//! - [`router`]: Route table and middleware stack
//! - [`state`]: Shared application state (repository + service graph)

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, AppError};
pub use router::create_router;
pub use state::AppState;
