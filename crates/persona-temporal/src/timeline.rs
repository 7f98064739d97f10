//! The locked timeline: event log, snapshot store, and generation clock
//! behind one `RwLock`, so a write and its invalidation are a single step.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use persona_core::models::{DimensionSchema, StateEvent};

use crate::event_store::EventLog;
use crate::snapshot::{Anchor, SnapshotStore};

/// Invalidation history kept per generation. Cache entries older than this
/// window are treated as stale.
const WATERMARK_HISTORY: usize = 65_536;

/// Monotonic write counter.
///
/// Each generation records the earliest timestamp its write could have
/// changed. A cached reconstruction for target `t` computed at generation
/// `g` is still valid iff every later generation's watermark is after `t`.
#[derive(Debug)]
pub struct GenerationClock {
    current: u64,
    // Suffix minima: (generation, watermark) with strictly increasing
    // watermarks front to back. The first entry after `g` holds the minimum
    // watermark over every generation after `g`.
    minima: VecDeque<(u64, DateTime<Utc>)>,
    // Generations at or below `base` are out of history.
    base: u64,
    published: Arc<AtomicU64>,
}

impl GenerationClock {
    pub fn new() -> Self {
        Self {
            current: 0,
            minima: VecDeque::new(),
            base: 0,
            published: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    /// Lock-free view of the current generation.
    pub fn handle(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.published)
    }

    /// Start a new generation whose writes affect `invalidated_from` onward.
    pub fn advance(&mut self, invalidated_from: DateTime<Utc>) -> u64 {
        self.current += 1;
        while self
            .minima
            .back()
            .is_some_and(|&(_, watermark)| watermark >= invalidated_from)
        {
            self.minima.pop_back();
        }
        self.minima.push_back((self.current, invalidated_from));
        if self.current - self.base > WATERMARK_HISTORY as u64 {
            self.base += 1;
            while self.minima.front().is_some_and(|&(g, _)| g <= self.base) {
                self.minima.pop_front();
            }
        }
        self.published.store(self.current, Ordering::Release);
        self.current
    }

    /// Earliest timestamp invalidated by any generation after `since`.
    /// `Some(DateTime::MIN_UTC)` when `since` predates the kept history.
    /// Logarithmic in the number of kept minima.
    pub fn earliest_invalidated_since(&self, since: u64) -> Option<DateTime<Utc>> {
        if since >= self.current {
            return None;
        }
        if since < self.base {
            return Some(DateTime::<Utc>::MIN_UTC);
        }
        let first_after = self.minima.partition_point(|&(g, _)| g <= since);
        self.minima.get(first_after).map(|&(_, watermark)| watermark)
    }

    /// Whether a result for `target` computed at `generation` still holds.
    pub fn is_valid(&self, generation: u64, target: DateTime<Utc>) -> bool {
        match self.earliest_invalidated_since(generation) {
            None => true,
            Some(watermark) => target < watermark,
        }
    }

    /// Suffix-minimum entries currently kept.
    pub fn tracked_minima(&self) -> usize {
        self.minima.len()
    }
}

impl Default for GenerationClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything guarded by the timeline lock.
#[derive(Debug)]
pub struct TimelineState {
    pub log: EventLog,
    pub snapshots: SnapshotStore,
    pub clock: GenerationClock,
}

/// Inputs for one reconstruction, copied out under the read lock.
#[derive(Debug, Clone)]
pub struct ReplayView {
    pub generation: u64,
    pub anchor: Anchor,
    pub events: Vec<StateEvent>,
    pub compacted_through: Option<DateTime<Utc>>,
}

impl TimelineState {
    pub fn new(schema: Arc<DimensionSchema>) -> Self {
        Self {
            log: EventLog::new(Arc::clone(&schema)),
            snapshots: SnapshotStore::new(schema),
            clock: GenerationClock::new(),
        }
    }

    /// Anchor plus the events in `(anchor, target]`.
    pub fn view_at(&self, target: DateTime<Utc>) -> ReplayView {
        let anchor = self.snapshots.nearest_at_or_before(target);
        let events = self.log.range(anchor.timestamp(), target).to_vec();
        ReplayView {
            generation: self.clock.current(),
            anchor,
            events,
            compacted_through: self.log.compacted_through(),
        }
    }
}

/// Shared, lock-protected timeline.
///
/// Readers copy what they need and release the lock before replaying, so a
/// long reconstruction never blocks appends. A panicked writer leaves the
/// data structurally valid (every mutation is a single push or insert), so
/// poisoned locks are recovered rather than propagated.
#[derive(Debug)]
pub struct Timeline {
    state: RwLock<TimelineState>,
}

impl Timeline {
    pub fn new(state: TimelineState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, TimelineState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, TimelineState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
