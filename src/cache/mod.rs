//! Get-or-compute cache with TTL and source-version invalidation.
//!
//! Entries are keyed by an identifier (typically a document path) and carry
//! the source version they were computed from. A lookup hits only when the
//! entry is younger than the TTL and its version is at least the version the
//! caller supplies.
//!
//! Loads are not de-duplicated: two callers missing on the same key both run
//! their loader and the later insert wins. Loaders run without the cache lock
//! held.

use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use serde_json::json;

use crate::logging::{LogLevel, Logger, TARGET_CACHE, json_kv};

/// Monotonic source-modification marker, e.g. a file's modification stamp.
pub type SourceVersion = u64;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub payload: T,
    pub inserted_at: Instant,
    pub source_version: SourceVersion,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.inserted_at) < ttl
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub loads: u64,
    pub swept: u64,
}

struct Inner<T> {
    entries: HashMap<String, CacheEntry<T>>,
    stats: CacheStats,
}

struct Sweeper {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

pub struct MemoCache<T> {
    inner: Arc<Mutex<Inner<T>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    logger: Logger,
    sweeper: Option<Sweeper>,
}

impl<T> std::fmt::Debug for MemoCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoCache")
            .field("ttl", &self.ttl)
            .field("len", &self.len())
            .field("sweeping", &self.sweeper.is_some())
            .finish()
    }
}

impl<T> MemoCache<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }

    pub fn with_clock<C>(ttl: Duration, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                stats: CacheStats::default(),
            })),
            ttl,
            clock: Arc::new(clock),
            logger: Logger::null(),
            sweeper: None,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached payload for `key` if fresh and computed from at least `version`.
    pub fn get(&self, key: &str, version: SourceVersion) -> Option<T> {
        let now = self.clock.now();
        let mut inner = self.lock();
        let hit = inner
            .entries
            .get(key)
            .filter(|entry| entry.is_fresh(now, self.ttl) && entry.source_version >= version)
            .map(|entry| entry.payload.clone());
        match hit {
            Some(_) => inner.stats.hits += 1,
            None => inner.stats.misses += 1,
        }
        hit
    }

    pub fn insert(&self, key: impl Into<String>, version: SourceVersion, payload: T) {
        let entry = CacheEntry {
            payload,
            inserted_at: self.clock.now(),
            source_version: version,
        };
        let mut inner = self.lock();
        inner.entries.insert(key.into(), entry);
        inner.stats.loads += 1;
    }

    pub fn get_or_load<F>(&self, key: &str, version: SourceVersion, loader: F) -> T
    where
        F: FnOnce() -> T,
    {
        if let Some(hit) = self.get(key, version) {
            return hit;
        }
        let payload = loader();
        self.insert(key, version, payload.clone());
        payload
    }

    /// Fallible variant; errors are returned and nothing is cached.
    pub fn try_get_or_load<F, E>(
        &self,
        key: &str,
        version: SourceVersion,
        loader: F,
    ) -> std::result::Result<T, E>
    where
        F: FnOnce() -> std::result::Result<T, E>,
    {
        if let Some(hit) = self.get(key, version) {
            return Ok(hit);
        }
        let payload = loader()?;
        self.insert(key, version, payload.clone());
        Ok(payload)
    }

    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Drop every TTL-expired entry, returning how many were removed.
    pub fn sweep_expired(&self) -> usize {
        sweep(&self.inner, self.clock.as_ref(), self.ttl)
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    /// Start a background thread sweeping expired entries every `interval`.
    /// Restarts the sweeper if one is already running; a zero interval only
    /// stops it.
    pub fn start_sweeper(&mut self, interval: Duration) {
        self.stop_sweeper();
        if interval.is_zero() {
            return;
        }

        let (stop, signal) = mpsc::channel::<()>();
        let inner = Arc::clone(&self.inner);
        let clock = Arc::clone(&self.clock);
        let logger = self.logger.clone();
        let ttl = self.ttl;

        let handle = std::thread::spawn(move || {
            loop {
                match signal.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let removed = sweep(&inner, clock.as_ref(), ttl);
                        if removed > 0 {
                            logger.emit(
                                LogLevel::Debug,
                                TARGET_CACHE,
                                "cache_swept",
                                [json_kv("removed", json!(removed))],
                            );
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        self.sweeper = Some(Sweeper { stop, handle });
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweeper.is_some()
    }

    /// Stop the sweeper and drop every entry.
    pub fn dispose(&mut self) {
        self.stop_sweeper();
        self.clear();
    }

    fn stop_sweeper(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            let _ = sweeper.stop.send(());
            let _ = sweeper.handle.join();
        }
    }
}

impl<T> MemoCache<T> {
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Drop for MemoCache<T> {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            let _ = sweeper.stop.send(());
            let _ = sweeper.handle.join();
        }
    }
}

fn sweep<T>(inner: &Mutex<Inner<T>>, clock: &dyn Clock, ttl: Duration) -> usize {
    let now = clock.now();
    let mut guard = inner.lock().unwrap_or_else(PoisonError::into_inner);
    let before = guard.entries.len();
    guard.entries.retain(|_, entry| entry.is_fresh(now, ttl));
    let removed = before - guard.entries.len();
    guard.stats.swept += removed as u64;
    removed
}
