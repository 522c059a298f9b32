//! Fingerprint policies map an alert to the key it is deduplicated under and
//! the length of its suppression window.

use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::models::Alert;

/// The dedup key of an alert and how long repeats of it are suppressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// Alerts with equal keys are duplicates of each other.
    pub key: String,
    /// Suppression window, anchored at the first occurrence of `key`. A zero
    /// window disables deduplication for the alert.
    pub ttl: Duration,
}

impl Fingerprint {
    /// Creates a fingerprint.
    pub fn new(key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            ttl,
        }
    }
}

/// Computes the fingerprint of an alert.
///
/// Implementations must be pure: equal alerts yield equal fingerprints for
/// the lifetime of the process. Any `Fn(&Alert) -> Fingerprint` closure is a
/// policy.
pub trait FingerprintPolicy: Send + Sync {
    /// Returns the fingerprint of `alert`.
    fn fingerprint(&self, alert: &Alert) -> Fingerprint;
}

impl<F> FingerprintPolicy for F
where
    F: Fn(&Alert) -> Fingerprint + Send + Sync,
{
    fn fingerprint(&self, alert: &Alert) -> Fingerprint {
        self(alert)
    }
}

/// Default policy: the subject followed by the hex SHA-256 of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentFingerprint {
    ttl: Duration,
}

impl ContentFingerprint {
    /// Creates the policy with the given suppression window.
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }
}

impl Default for ContentFingerprint {
    fn default() -> Self {
        Self::new(Duration::from_secs(5 * 60))
    }
}

impl FingerprintPolicy for ContentFingerprint {
    fn fingerprint(&self, alert: &Alert) -> Fingerprint {
        let digest = Sha256::digest(alert.message.as_bytes());
        Fingerprint {
            key: format!("{}{}", alert.subject, hex::encode(digest)),
            ttl: self.ttl,
        }
    }
}
