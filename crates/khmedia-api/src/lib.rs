//! khmedia API Library
//!
//! HTTP handlers, admin authentication and application setup.

mod handlers;
mod utils;

pub mod auth;
pub mod error;
pub mod setup;
pub mod state;

pub use error::HttpAppError;
pub use state::AppState;
