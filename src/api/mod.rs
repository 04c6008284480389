//! HTTP API for the benefits and tax engine.
//!
//! One POST endpoint per calculator; see [`create_router`].

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::ProrationRequest;
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
