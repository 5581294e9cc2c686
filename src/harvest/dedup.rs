//! In-run dedup of ingestion attempts
//!
//! History pages overlap as the cursor walks backwards, and the same
//! match can surface in more than one hero partition, so every record
//! is checked against the composite `"{batch_time}_{match_id}"` key
//! before any encoding or storage work happens.
//!
//! The cache lives in memory for one process run only. Across restarts
//! the match store's idempotent keys make a re-store harmless; the
//! progress ledger is only advanced on first sight within a run.

use std::collections::HashSet;

use super::schema::composite_key;

#[derive(Debug, Default)]
pub struct DedupCache {
    seen: HashSet<String>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sighting. Returns true on first sight, false when the
    /// pair was already processed this run.
    pub fn insert(&mut self, batch_time: i64, match_id: u64) -> bool {
        self.seen.insert(composite_key(batch_time, match_id))
    }

    /// Whether the pair was already seen, without marking it.
    pub fn contains(&self, batch_time: i64, match_id: u64) -> bool {
        self.seen.contains(&composite_key(batch_time, match_id))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
