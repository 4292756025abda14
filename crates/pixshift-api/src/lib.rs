//! Pixshift API Library
//!
//! HTTP surface of the image conversion service: multipart ingestion,
//! handlers, middleware and application setup.

mod api_doc;
pub mod constants;
mod handlers;
mod middleware;
pub mod setup;
mod telemetry;
mod utils;

pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
