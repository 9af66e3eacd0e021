//! Time-bounded cache for hub catalog responses.

use std::time::{Duration, Instant};

/// Default catalog lifetime (one hour).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Holds one value together with the instant it was stored.
///
/// A zero TTL disables caching: every lookup misses.
#[derive(Debug, Clone)]
pub struct TtlCache<T> {
    ttl: Duration,
    entry: Option<(Instant, T)>,
}

impl<T: Clone> TtlCache<T> {
    /// Create an empty cache
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached value if it is younger than the TTL.
    pub fn get(&self) -> Option<T> {
        self.get_at(Instant::now())
    }

    fn get_at(&self, now: Instant) -> Option<T> {
        match &self.entry {
            Some((stored, value)) if now.saturating_duration_since(*stored) < self.ttl => {
                Some(value.clone())
            }
            _ => None,
        }
    }

    /// Store a fresh value.
    pub fn put(&mut self, value: T) {
        self.entry = Some((Instant::now(), value));
    }

    /// Forget the cached value.
    pub fn clear(&mut self) {
        self.entry = None;
    }

    /// Age of the cached value, whether or not it has expired.
    pub fn age(&self) -> Option<Duration> {
        self.entry.as_ref().map(|(stored, _)| stored.elapsed())
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}
