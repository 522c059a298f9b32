//! "First occurrence wins" suppression of repeated alerts.
//!
//! The deduplicator remembers the fingerprint key of every alert it lets
//! through. Another alert with the same key is suppressed until the window
//! of the first one has elapsed. Repeats never extend the window.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use dashmap::{DashMap, mapref::entry::Entry};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    engine::{
        clock::Clock,
        fingerprint::{Fingerprint, FingerprintPolicy},
    },
    models::Alert,
};

/// Decides whether an alert must not be delivered.
///
/// Implementations may record the alert as a side effect; the dispatcher
/// calls this exactly once per alert.
pub trait SuppressionPolicy: Send + Sync {
    /// Returns `true` if the alert must be suppressed.
    fn should_suppress(&self, alert: &Alert) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct DedupEntry {
    inserted_at: Instant,
    ttl: Duration,
}

impl DedupEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }
}

const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// A process-wide cache of recently delivered alert fingerprints.
pub struct Deduplicator {
    policy: Arc<dyn FingerprintPolicy>,
    clock: Arc<dyn Clock>,
    entries: DashMap<String, DedupEntry>,
    origin: Instant,
    purge_interval: Duration,
    // Milliseconds since `origin` of the last amortized purge.
    last_purge_ms: AtomicU64,
}

impl Deduplicator {
    /// Creates a deduplicator using the given fingerprint policy and clock.
    pub fn new(policy: Arc<dyn FingerprintPolicy>, clock: Arc<dyn Clock>) -> Self {
        let origin = clock.now();
        Self {
            policy,
            clock,
            entries: DashMap::new(),
            origin,
            purge_interval: DEFAULT_PURGE_INTERVAL,
            last_purge_ms: AtomicU64::new(0),
        }
    }

    /// Sets how often inserts purge expired entries. Defaults to one minute.
    pub fn with_purge_interval(mut self, interval: Duration) -> Self {
        self.purge_interval = interval;
        self
    }

    /// Records `alert` and reports whether it repeats a live fingerprint.
    ///
    /// The check and the insert happen under the same map shard lock, so of
    /// several concurrent alerts sharing a key exactly one gets through.
    pub fn check_and_record(&self, alert: &Alert) -> bool {
        let Fingerprint { key, ttl } = self.policy.fingerprint(alert);
        if ttl.is_zero() {
            return false;
        }

        let now = self.clock.now();
        let suppressed = match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(DedupEntry {
                        inserted_at: now,
                        ttl,
                    });
                    false
                } else {
                    tracing::debug!(
                        key = %occupied.key(),
                        "Duplicate alert within dedup window."
                    );
                    true
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(DedupEntry {
                    inserted_at: now,
                    ttl,
                });
                false
            }
        };

        // The entry guard is released here; purging locks every shard.
        if !suppressed {
            self.purge_if_due(now);
        }
        suppressed
    }

    fn purge_if_due(&self, now: Instant) {
        let now_ms = now.saturating_duration_since(self.origin).as_millis() as u64;
        let last = self.last_purge_ms.load(Ordering::Acquire);
        if now_ms.saturating_sub(last) < self.purge_interval.as_millis() as u64 {
            return;
        }
        // Only the caller that claims the slot purges.
        if self
            .last_purge_ms
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let removed = self.purge_expired_at(now);
            if removed > 0 {
                tracing::debug!(removed, remaining = self.len(), "Purged expired dedup entries.");
            }
        }
    }

    /// Removes expired entries and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(self.clock.now())
    }

    fn purge_expired_at(&self, now: Instant) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Number of remembered fingerprints, including expired ones not yet
    /// purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no fingerprint is remembered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Spawns a task purging expired entries every `interval` until `cancel`
    /// is triggered. Intervals below one second are raised to one second.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = self.purge_expired();
                        if removed > 0 {
                            tracing::debug!(
                                removed,
                                remaining = self.len(),
                                "Purged expired dedup entries."
                            );
                        }
                    }
                }
            }
            tracing::debug!("Dedup sweeper stopped.");
        })
    }
}

impl SuppressionPolicy for Deduplicator {
    fn should_suppress(&self, alert: &Alert) -> bool {
        self.check_and_record(alert)
    }
}
