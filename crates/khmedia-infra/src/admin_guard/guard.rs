use super::clock::{Clock, SystemClock};
use khmedia_core::constants::STATIC_ADMIN_WHITELIST;
use khmedia_core::AdminGuardConfig;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const SHARD_COUNT: usize = 16;
/// Entries a shard holds before a sweep runs on insert.
const MAX_ENTRIES_PER_SHARD: usize = 1_024;

/// Failed-attempt bookkeeping for one IP.
#[derive(Debug, Clone)]
struct AttemptEntry {
    attempts: u32,
    window_expires_at: Instant,
    blocked_at: Option<Instant>,
}

/// Where an IP stands with the failed-attempt limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Clean,
    Accumulating(u32),
    Blocked,
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    IpNotAllowed,
    TooManyAttempts,
}

impl DenyReason {
    pub fn message(self) -> &'static str {
        match self {
            DenyReason::IpNotAllowed => "Access denied: IP not allowed",
            DenyReason::TooManyAttempts => "Access denied: Too many attempts",
        }
    }
}

/// IP allow-list plus a per-IP failed-attempt limiter for the admin area.
///
/// Attempts are kept in sharded in-process maps and never persisted. The
/// first failure opens a counting window of `attempt_window`; reaching
/// `max_attempts` blocks the IP for `block_duration`, after which the next
/// evaluation clears it.
#[derive(Clone)]
pub struct AdminAccessGuard {
    shards: Vec<Arc<Mutex<HashMap<String, AttemptEntry>>>>,
    clock: Arc<dyn Clock>,
    allowed_ips: Vec<String>,
    path_prefix: String,
    max_attempts: u32,
    block_duration: Duration,
    attempt_window: Duration,
    trusted_proxy_count: usize,
    debug: bool,
}

impl AdminAccessGuard {
    pub fn new(config: &AdminGuardConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &AdminGuardConfig, clock: Arc<dyn Clock>) -> Self {
        let mut allowed_ips: Vec<String> =
            STATIC_ADMIN_WHITELIST.iter().map(|ip| ip.to_string()).collect();
        if let Some(ip) = config.deployment_ip.as_deref() {
            allowed_ips.push(ip.trim().to_string());
        }

        let shards = (0..SHARD_COUNT)
            .map(|_| Arc::new(Mutex::new(HashMap::new())))
            .collect();

        Self {
            shards,
            clock,
            allowed_ips,
            path_prefix: config.path_prefix(),
            max_attempts: config.max_attempts,
            block_duration: config.block_duration(),
            attempt_window: config.attempt_window(),
            trusted_proxy_count: config.trusted_proxy_count,
            debug: config.debug,
        }
    }

    fn shard(&self, ip: &str) -> &Mutex<HashMap<String, AttemptEntry>> {
        let mut hasher = DefaultHasher::new();
        ip.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }

    /// Path prefix the guard protects, with leading and trailing slash.
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    pub fn protects(&self, path: &str) -> bool {
        path.starts_with(&self.path_prefix)
    }

    pub fn trusted_proxy_count(&self) -> usize {
        self.trusted_proxy_count
    }

    /// Allow-list check. Debug mode lets every IP through.
    pub fn is_ip_whitelisted(&self, ip: &str) -> bool {
        self.debug || self.allowed_ips.iter().any(|allowed| allowed == ip)
    }

    /// Drop expired state. Returns false when the entry should be removed.
    fn refresh(&self, entry: &AttemptEntry, now: Instant) -> bool {
        now < self.expires_at(entry)
    }

    fn expires_at(&self, entry: &AttemptEntry) -> Instant {
        match entry.blocked_at {
            Some(blocked_at) => blocked_at + self.block_duration,
            None => entry.window_expires_at,
        }
    }

    /// Make room in a full shard: drop expired entries, then the unblocked
    /// entry closest to expiry if it is still at capacity. Blocks are only
    /// evicted when nothing else is left.
    fn make_room(&self, entries: &mut HashMap<String, AttemptEntry>, now: Instant) {
        if entries.len() < MAX_ENTRIES_PER_SHARD {
            return;
        }

        let before = entries.len();
        entries.retain(|_, entry| self.refresh(entry, now));

        if entries.len() >= MAX_ENTRIES_PER_SHARD {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| (entry.blocked_at.is_some(), self.expires_at(entry)))
                .map(|(ip, _)| ip.clone());
            if let Some(ip) = oldest {
                entries.remove(&ip);
                tracing::debug!(
                    evicted_ip = %ip,
                    remaining = entries.len(),
                    "Evicted admin attempt record due to shard capacity"
                );
            }
        }

        if before > entries.len() + 1 {
            tracing::debug!(
                removed = before - entries.len(),
                "Swept admin attempt records"
            );
        }
    }

    /// Remove expired windows and blocks from every shard.
    pub async fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        for shard in &self.shards {
            let mut entries = shard.lock().await;
            let before = entries.len();
            entries.retain(|_, entry| self.refresh(entry, now));
            removed += before - entries.len();
        }
        if removed > 0 {
            tracing::debug!(removed, "Cleaned up expired admin attempt records");
        }
        removed
    }

    /// Records currently held across all shards.
    pub async fn tracked_ips(&self) -> usize {
        let mut total = 0;
        for shard in &self.shards {
            total += shard.lock().await.len();
        }
        total
    }

    pub async fn state(&self, ip: &str) -> AccessState {
        let now = self.clock.now();
        let mut entries = self.shard(ip).lock().await;

        let snapshot = entries
            .get(ip)
            .map(|e| (self.refresh(e, now), e.blocked_at.is_some(), e.attempts));

        match snapshot {
            None => AccessState::Clean,
            Some((false, _, _)) => {
                entries.remove(ip);
                tracing::debug!(ip = %ip, "Admin attempt record expired");
                AccessState::Clean
            }
            Some((true, true, _)) => AccessState::Blocked,
            Some((true, false, attempts)) => AccessState::Accumulating(attempts),
        }
    }

    /// Failed attempts currently counted for `ip`.
    pub async fn attempts(&self, ip: &str) -> u32 {
        match self.state(ip).await {
            AccessState::Clean => 0,
            AccessState::Accumulating(attempts) => attempts,
            AccessState::Blocked => {
                let entries = self.shard(ip).lock().await;
                entries.get(ip).map(|e| e.attempts).unwrap_or(0)
            }
        }
    }

    /// Count one failed attempt and return the new total.
    pub async fn record_failed_attempt(&self, ip: &str) -> u32 {
        let now = self.clock.now();
        let mut entries = self.shard(ip).lock().await;

        let expired = entries.get(ip).is_some_and(|e| !self.refresh(e, now));
        if expired {
            entries.remove(ip);
        }
        if !entries.contains_key(ip) {
            self.make_room(&mut entries, now);
        }

        let entry = entries.entry(ip.to_string()).or_insert_with(|| AttemptEntry {
            attempts: 0,
            window_expires_at: now + self.attempt_window,
            blocked_at: None,
        });
        entry.attempts += 1;

        tracing::warn!(ip = %ip, attempts = entry.attempts, "Failed admin attempt");

        if entry.attempts >= self.max_attempts && entry.blocked_at.is_none() {
            entry.blocked_at = Some(now);
            tracing::warn!(
                ip = %ip,
                attempts = entry.attempts,
                block_secs = self.block_duration.as_secs(),
                "IP blocked after too many failed admin attempts"
            );
        }

        entry.attempts
    }

    /// Check both rules, reporting which one refused the IP.
    pub async fn check(&self, ip: &str) -> Result<(), DenyReason> {
        if !self.is_ip_whitelisted(ip) {
            return Err(DenyReason::IpNotAllowed);
        }
        if self.state(ip).await == AccessState::Blocked {
            return Err(DenyReason::TooManyAttempts);
        }
        Ok(())
    }

    pub async fn is_allowed(&self, ip: &str) -> bool {
        self.check(ip).await.is_ok()
    }
}
