//! Admin access guard
//!
//! Decides whether a client IP may reach the admin area: the IP must be on the
//! allow-list (skipped in debug mode) and must not be blocked for too many
//! failed attempts.

mod clock;
mod guard;

pub use clock::{Clock, ManualClock, SystemClock};
pub use guard::{AccessState, AdminAccessGuard, DenyReason};
