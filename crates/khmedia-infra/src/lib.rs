//! khmedia Infrastructure Library
//!
//! Shared infrastructure used by the API and CLI binaries:
//! - Admin access guard (IP allow-list and failed-attempt limiter) and its middleware
//! - Client IP extraction
//! - Telemetry initialization
//! - HTTP error response body

pub mod admin_guard;
pub mod error;
pub mod ip;
pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use admin_guard::{AccessState, AdminAccessGuard, Clock, DenyReason, ManualClock, SystemClock};
pub use error::ErrorResponse;
pub use ip::extract_client_ip;
pub use middleware::admin_guard_middleware;
pub use telemetry::init_telemetry;
