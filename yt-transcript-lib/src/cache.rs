//! Transcript cache
//!
//! Keeps the full entry sequence of recently fetched videos so repeated
//! windowed lookups need no network round trip. Keyed by video id with TTL
//! and capacity eviction; a single-slot compatibility mode reproduces the
//! original extension's "last fetch wins, whatever the video" behavior.

use crate::types::TranscriptEntry;
use crate::window::window_text;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;

/// Clock abstraction so expiry is testable without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Wall-clock time; the default outside tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Cache behavior mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// One slot per video id
    Keyed,
    /// Mimic the original extension: inserting any transcript evicts every
    /// other video, so at most one transcript exists at a time
    SingleSlot,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Keyed or single-slot behavior
    pub mode: CacheMode,

    /// Maximum number of videos to keep (ignored in single-slot mode)
    pub max_videos: usize,

    /// Time-to-live for cached transcripts in seconds
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            mode: CacheMode::Keyed,
            max_videos: 16,
            ttl_secs: 900, // 15 minutes, comfortably past one video's runtime
        }
    }
}

/// Cache slot with metadata
#[derive(Debug, Clone)]
struct CacheSlot {
    entries: Arc<Vec<TranscriptEntry>>,
    created_at: SystemTime,
}

impl CacheSlot {
    fn age_secs(&self, now: SystemTime) -> u64 {
        now.duration_since(self.created_at)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    fn is_expired(&self, ttl_secs: u64, now: SystemTime) -> bool {
        self.age_secs(now) > ttl_secs
    }
}

/// Keyed transcript cache
pub struct TranscriptCache {
    slots: DashMap<String, CacheSlot>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl TranscriptCache {
    /// Create a cache backed by the system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache with an injected clock
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: DashMap::new(),
            config,
            clock,
        }
    }

    /// Store the full transcript for a video, last-writer-wins per key.
    pub fn insert(&self, video_id: &str, entries: impl Into<Arc<Vec<TranscriptEntry>>>) {
        if self.config.mode == CacheMode::SingleSlot {
            self.slots.retain(|key, _| key == video_id);
        } else if self.slots.len() >= self.config.max_videos && !self.slots.contains_key(video_id) {
            self.evict_for_capacity();
        }

        self.slots.insert(
            video_id.to_string(),
            CacheSlot {
                entries: entries.into(),
                created_at: self.clock.now(),
            },
        );
    }

    /// Windowed lookup.
    ///
    /// `None` means miss: no slot for the video, an expired slot, or a
    /// stored transcript whose window around `current_time` is empty. The
    /// last case is deliberately indistinguishable from absence, matching
    /// the original's contract; callers fall through to a re-fetch that the
    /// per-key dedup in the service keeps cheap.
    pub fn get(&self, video_id: &str, current_time: f64) -> Option<String> {
        let now = self.clock.now();
        let text = {
            let slot = self.slots.get(video_id)?;
            if slot.is_expired(self.config.ttl_secs, now) {
                None
            } else {
                Some(window_text(&slot.entries, current_time))
            }
        };
        match text {
            None => {
                self.slots.remove(video_id);
                None
            }
            Some(t) if t.is_empty() => {
                tracing::debug!(video_id, current_time, "cached transcript has no overlap");
                None
            }
            Some(t) => Some(t),
        }
    }

    /// Full stored sequence for a video, if present and fresh.
    pub fn entries(&self, video_id: &str) -> Option<Arc<Vec<TranscriptEntry>>> {
        let now = self.clock.now();
        let result = {
            let slot = self.slots.get(video_id)?;
            if slot.is_expired(self.config.ttl_secs, now) {
                None
            } else {
                Some(Arc::clone(&slot.entries))
            }
        };
        if result.is_none() {
            self.slots.remove(video_id);
        }
        result
    }

    /// Whether a fresh transcript is cached for this video.
    pub fn contains(&self, video_id: &str) -> bool {
        self.entries(video_id).is_some()
    }

    /// Drop every expired slot; returns how many were removed. Called
    /// opportunistically and from the server's background sweep.
    pub fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.slots.len();
        self.slots
            .retain(|_, slot| !slot.is_expired(self.config.ttl_secs, now));
        before - self.slots.len()
    }

    /// Make room for one more video: expired slots first, then the oldest.
    fn evict_for_capacity(&self) {
        self.evict_expired();
        while self.slots.len() >= self.config.max_videos {
            let oldest = self
                .slots
                .iter()
                .min_by_key(|slot| slot.value().created_at)
                .map(|slot| slot.key().clone());
            match oldest {
                Some(key) => {
                    self.slots.remove(&key);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&self) {
        self.slots.clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let mut video_count = 0;
        let mut entry_count = 0;
        let mut oldest_age = 0;

        for slot in self.slots.iter() {
            video_count += 1;
            entry_count += slot.value().entries.len();
            let age = slot.value().age_secs(now);
            if age > oldest_age {
                oldest_age = age;
            }
        }

        CacheStats {
            video_count,
            entry_count,
            ttl_secs: self.config.ttl_secs,
            oldest_entry_age_secs: oldest_age,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub video_count: usize,
    pub entry_count: usize,
    pub ttl_secs: u64,
    pub oldest_entry_age_secs: u64,
}
