//! Best-effort removal of the assets behind a record that is being deleted.

mod service;

pub use service::{CleanupReport, MediaCleanup};
