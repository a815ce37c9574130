//! Shared constants.

/// Default admin path segment used when `ADMIN_URL` is not set.
pub const DEFAULT_ADMIN_URL: &str = "khs-secure-admin-2024/";

/// Addresses that may always reach the admin panel.
pub const STATIC_ADMIN_WHITELIST: &[&str] = &["127.0.0.1", "::1", "localhost"];

/// Failed admin attempts before an IP is blocked.
pub const ADMIN_MAX_ATTEMPTS: u32 = 5;

/// Block duration after too many failed admin attempts (15 minutes).
pub const ADMIN_BLOCK_DURATION_SECS: u64 = 900;

/// Credentials copied from the sample env file; treated as "not configured".
pub const PLACEHOLDER_REMOTE_URL: &str = "your_supabase_url";
pub const PLACEHOLDER_REMOTE_KEY: &str = "your_supabase_anon_key";

/// Path segment that precedes `{bucket}/{path}` in public object URLs.
pub const PUBLIC_OBJECT_MARKER: &str = "public";
