//! Reconstruction cache: Moka in-memory, keyed by (target, depth, context).
//! Entries are tagged with the generation they were computed at and
//! validated lazily against the generation clock on read.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use moka::sync::Cache;

use persona_core::config::CacheConfig;
use persona_core::models::{ContextFingerprint, Depth, ReconstructionResult};

use crate::timeline::GenerationClock;

/// Identity of a reconstruction. Two queries with equal keys and no
/// intervening relevant write return identical results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub target: DateTime<Utc>,
    pub depth: Depth,
    pub context: ContextFingerprint,
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: ReconstructionResult,
    pub generation: u64,
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries found but rejected by the generation check.
    pub stale: u64,
    pub entries: u64,
}

/// Bounded cache of reconstruction results (TinyLFU admission).
pub struct ReconstructionCache {
    inner: Option<Cache<CacheKey, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    stale: AtomicU64,
}

impl ReconstructionCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            inner: (config.enabled && config.capacity > 0).then(|| Cache::new(config.capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stale: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Cached result for `key` if no write since it was computed touched
    /// `key.target` or earlier. Still-valid entries are re-tagged with the
    /// current generation so the next check skips the generations already
    /// cleared.
    pub fn lookup(&self, key: &CacheKey, clock: &GenerationClock) -> Option<ReconstructionResult> {
        let inner = self.inner.as_ref()?;
        let Some(entry) = inner.get(key) else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        if !clock.is_valid(entry.generation, key.target) {
            tracing::debug!(
                target_ts = %key.target,
                cached_generation = entry.generation,
                current_generation = clock.current(),
                "stale reconstruction evicted"
            );
            inner.invalidate(key);
            self.stale.fetch_add(1, Ordering::Relaxed);
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        if entry.generation != clock.current() {
            inner.insert(
                *key,
                CacheEntry {
                    result: entry.result.clone(),
                    generation: clock.current(),
                },
            );
        }
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(entry.result)
    }

    pub fn insert(&self, key: CacheKey, result: ReconstructionResult, generation: u64) {
        if let Some(inner) = &self.inner {
            inner.insert(key, CacheEntry { result, generation });
        }
    }

    pub fn invalidate_all(&self) {
        if let Some(inner) = &self.inner {
            inner.invalidate_all();
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stale: self.stale.load(Ordering::Relaxed),
            entries: self.inner.as_ref().map_or(0, Cache::entry_count),
        }
    }
}

impl std::fmt::Debug for ReconstructionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconstructionCache")
            .field("enabled", &self.is_enabled())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use persona_core::models::{Basis, DimensionSchema};

    fn result(target: DateTime<Utc>) -> ReconstructionResult {
        ReconstructionResult {
            target,
            state: DimensionSchema::default_profile().baseline(),
            confidence: 0.5,
            basis: Basis::ExtrapolatedBackward,
            anchor: None,
            events_replayed: 0,
            signals_blended: 0,
        }
    }

    fn key(target: DateTime<Utc>) -> CacheKey {
        CacheKey {
            target,
            depth: Depth::Core,
            context: ContextFingerprint::NONE,
        }
    }

    #[test]
    fn entries_before_the_watermark_survive() {
        let cache = ReconstructionCache::new(&CacheConfig::default());
        let mut clock = GenerationClock::new();
        let t0 = Utc::now();
        let early = key(t0);
        let late = key(t0 + Duration::days(10));
        cache.insert(early, result(early.target), clock.current());
        cache.insert(late, result(late.target), clock.current());

        clock.advance(t0 + Duration::days(5));

        assert!(cache.lookup(&early, &clock).is_some());
        assert!(cache.lookup(&late, &clock).is_none());
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.stale, 1);
    }

    #[test]
    fn disabled_cache_never_hits() {
        let cache = ReconstructionCache::new(&CacheConfig {
            enabled: false,
            ..Default::default()
        });
        let clock = GenerationClock::new();
        let k = key(Utc::now());
        cache.insert(k, result(k.target), 0);
        assert!(cache.lookup(&k, &clock).is_none());
        assert!(!cache.is_enabled());
    }
}
