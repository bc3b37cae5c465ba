//! The latest-value state holder shared by the UDP and HTTP paths.
//!
//! [`StateHolder`] keeps the payload of the most recent accepted write
//! together with two timestamps: when anything was last written, and when
//! the configured zero value was last written. All three fields live
//! behind a single [`RwLock`] and are always read and written as a unit,
//! so a reader can never pair a timestamp with a value from a different
//! write.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

/// The mutable triple guarded by the holder's lock.
#[derive(Debug)]
struct Latched {
    value: Vec<u8>,
    last_update: DateTime<Utc>,
    last_zero: DateTime<Utc>,
}

/// Point-in-time view of the retained state.
///
/// Serializes to the `data` object of the HTTP response. Timestamps are
/// RFC3339 strings in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// The retained payload decoded as text (invalid UTF-8 is replaced).
    pub value: String,
    /// Whether the retained payload equals the configured zero value.
    pub is_zero: bool,
    /// When the most recent write completed.
    pub last_update: DateTime<Utc>,
    /// When the zero value was most recently written.
    pub last_zero: DateTime<Utc>,
}

/// Concurrency-safe holder of the single most recent payload.
///
/// Shared via [`Arc`](std::sync::Arc) between the UDP loop (the only
/// writer) and HTTP handlers (readers). The payload is never exposed by
/// reference; every accessor returns an owned copy.
#[derive(Debug)]
pub struct StateHolder {
    zero: String,
    inner: RwLock<Latched>,
}

impl StateHolder {
    /// Create a holder whose initial value is `zero` and whose timestamps
    /// are both the construction time.
    pub fn new(zero: impl Into<String>) -> Self {
        let zero = zero.into();
        let now = Utc::now();
        Self {
            inner: RwLock::new(Latched {
                value: zero.as_bytes().to_vec(),
                last_update: now,
                last_zero: now,
            }),
            zero,
        }
    }

    /// The configured zero reference string.
    pub fn zero(&self) -> &str {
        &self.zero
    }

    /// Replace the retained value with a copy of `payload`.
    ///
    /// Stamps `last_update` with the current time, and `last_zero` with the
    /// same instant if `payload` equals the zero value. `last_update` never
    /// moves backwards even if the wall clock does. Returns the number of
    /// bytes retained, which is always `payload.len()`.
    pub async fn write(&self, payload: &[u8]) -> usize {
        let mut latched = self.inner.write().await;
        debug!(value = %String::from_utf8_lossy(payload), "rewrite value from client");

        let now = Utc::now().max(latched.last_update);
        latched.value.clear();
        latched.value.extend_from_slice(payload);
        latched.last_update = now;
        if payload == self.zero.as_bytes() {
            latched.last_zero = now;
        }
        payload.len()
    }

    /// The retained value decoded as text.
    pub async fn read(&self) -> String {
        let latched = self.inner.read().await;
        decode(&latched.value).into_owned()
    }

    /// Take a consistent snapshot of value, zero flag, and both timestamps.
    pub async fn snapshot(&self) -> StateSnapshot {
        let latched = self.inner.read().await;
        StateSnapshot {
            value: decode(&latched.value).into_owned(),
            is_zero: latched.value == self.zero.as_bytes(),
            last_update: latched.last_update,
            last_zero: latched.last_zero,
        }
    }
}

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}
