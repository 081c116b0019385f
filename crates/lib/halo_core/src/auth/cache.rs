//! Process-wide access token cache.
//!
//! Maps an opaque token string to the identity decoded from it, so the auth
//! gate can skip signature verification and claims parsing on repeat
//! requests. Each entry has two deadlines:
//!
//! - a ceiling fixed at insertion (the caller's TTL, at most the token's
//!   remaining lifetime minus the safety margin), and
//! - a sliding idle expiry that every hit pushes forward, never past the
//!   ceiling.
//!
//! Expiry is checked lazily on every read, and [`TokenCache::sweep`] evicts
//! stale entries in the background. Entries are replaced whole per key, so a
//! reader never sees a partially written one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::models::user::Identity;

/// Default sliding idle window for a cached token: 15 minutes.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(15 * 60);

/// Default interval between background sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CacheEntry {
    identity: Identity,
    expires_at: Instant,
    ceiling: Instant,
}

/// Concurrent token → identity cache with per-entry expiry.
#[derive(Debug)]
pub struct TokenCache {
    entries: DashMap<String, CacheEntry>,
    idle_ttl: Duration,
}

impl TokenCache {
    /// Create a cache with the default idle window.
    pub fn new() -> Self {
        Self::with_idle_ttl(DEFAULT_IDLE_TTL)
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            idle_ttl,
        }
    }

    /// Look up a token. A hit slides the entry's expiry forward (capped at
    /// its ceiling) and returns the identity stored at insertion.
    pub fn get(&self, token: &str) -> Option<Identity> {
        let now = Instant::now();

        if let Some(mut entry) = self.entries.get_mut(token) {
            if now < entry.expires_at {
                entry.expires_at = (now + self.idle_ttl).min(entry.ceiling);
                return Some(entry.identity.clone());
            }
        } else {
            return None;
        }

        self.entries.remove_if(token, |_, e| e.expires_at <= now);
        None
    }

    /// Insert or replace a token's identity. The entry never outlives `ttl`
    /// from now; a zero or negative `ttl` stores nothing.
    pub fn put(&self, token: impl Into<String>, identity: Identity, ttl: chrono::Duration) {
        let Ok(ttl) = ttl.to_std() else {
            return;
        };
        if ttl.is_zero() {
            return;
        }

        let now = Instant::now();
        let ceiling = now + ttl;
        let entry = CacheEntry {
            identity,
            expires_at: (now + self.idle_ttl).min(ceiling),
            ceiling,
        };
        self.entries.insert(token.into(), entry);
    }

    /// Drop every entry.
    pub fn flush(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evict expired entries.
    pub fn sweep(&self) {
        let now = Instant::now();
        self.entries.retain(|_, e| e.expires_at > now);
    }

    /// Spawn a periodic sweep task that stops when `cancel` fires.
    pub fn spawn_sweep_task(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let before = cache.len();
                        cache.sweep();
                        let evicted = before.saturating_sub(cache.len());
                        if evicted > 0 {
                            debug!(evicted, "token cache sweep");
                        }
                    }
                }
            }
        })
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}
