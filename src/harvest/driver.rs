//! Harvest driver
//!
//! Walks one hero/skill partition of the match history end to end:
//!
//! 1. Page through history summaries, newest first, stepping the
//!    cursor to `min(match_id) - 1` after each page.
//! 2. Fetch details for every listed match.
//! 3. Classify, deduplicate, encode, compress, persist.
//! 4. Count each success in the workflow ledger.
//!
//! A failed history fetch abandons the partition for this sweep and
//! flags it in the summary; a failed details fetch skips just that
//! match. Storage failures retry on a fixed delay and fall through to
//! the dead-letter table. Data integrity violations abort the
//! partition unless the configuration downgrades them to skips.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::sleep;

use super::config::HarvestConfig;
use super::dedup::DedupCache;
use super::encoder;
use super::error::{HarvestError, IntegrityError};
use super::fetcher::{MatchApi, START_AT_MATCH_ID};
use super::filter::{self, RejectReason, Verdict};
use super::meta::Skill;
use super::progress::ProgressTracker;
use super::schema::NormalizedMatch;
use super::store::MatchSink;

/// Where one processed match ended up.
enum MatchOutcome {
    Stored,
    Duplicate,
    Rejected(RejectReason),
    FetchSkipped,
    IntegritySkipped,
    DeadLettered,
}

/// Rejections by filter rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RejectCounts {
    pub bad_game_mode: u64,
    pub short_duration: u64,
    pub bad_lobby: u64,
    pub missing_players: u64,
    pub leaver: u64,
}

impl RejectCounts {
    fn bump(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::BadGameMode => self.bad_game_mode += 1,
            RejectReason::ShortDuration => self.short_duration += 1,
            RejectReason::BadLobby => self.bad_lobby += 1,
            RejectReason::MissingPlayers => self.missing_players += 1,
            RejectReason::Leaver => self.leaver += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.bad_game_mode + self.short_duration + self.bad_lobby + self.missing_players
            + self.leaver
    }
}

/// What one partition sweep accomplished.
#[derive(Debug, Clone)]
pub struct PartitionSummary {
    pub hero_id: i32,
    pub skill: Skill,
    /// History pages fetched.
    pub pages: u64,
    /// Summary entries whose processing started.
    pub seen: u64,
    /// Matches persisted and counted in the ledger.
    pub stored: u64,
    pub duplicates: u64,
    /// Matches dropped because their details fetch gave out.
    pub fetch_skips: u64,
    /// Integrity violations downgraded to skips by configuration.
    pub integrity_skips: u64,
    pub dead_letters: u64,
    pub rejects: RejectCounts,
    /// The history fetch itself gave out; the partition was abandoned
    /// for this sweep.
    pub fetch_failed: bool,
    pub elapsed: Duration,
}

impl PartitionSummary {
    fn new(hero_id: i32, skill: Skill) -> Self {
        Self {
            hero_id,
            skill,
            pages: 0,
            seen: 0,
            stored: 0,
            duplicates: 0,
            fetch_skips: 0,
            integrity_skips: 0,
            dead_letters: 0,
            rejects: RejectCounts::default(),
            fetch_failed: false,
            elapsed: Duration::ZERO,
        }
    }

    /// Throughput over the sweep, in matches seen per minute.
    pub fn matches_per_minute(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        60.0 * self.seen as f64 / secs
    }
}

/// Drives the fetch-filter-encode-persist pipeline.
///
/// One driver instance carries the dedup cache across partitions, so a
/// match listed under two heroes in the same run is stored once.
pub struct IngestionDriver {
    api: Arc<dyn MatchApi>,
    sink: Arc<dyn MatchSink>,
    progress: ProgressTracker,
    dedup: DedupCache,
    config: HarvestConfig,
}

impl IngestionDriver {
    pub fn new(
        api: Arc<dyn MatchApi>,
        sink: Arc<dyn MatchSink>,
        progress: ProgressTracker,
        config: HarvestConfig,
    ) -> Self {
        Self {
            api,
            sink,
            progress,
            dedup: DedupCache::new(),
            config,
        }
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Sweep one hero/skill partition until the stored-match quota is
    /// met or the history runs out.
    ///
    /// Returns `Ok` with a summary even when the upstream was
    /// unreachable (`fetch_failed` set); only integrity violations
    /// (with halting configured) and ledger failures surface as `Err`.
    pub async fn run_partition(
        &mut self,
        hero_id: i32,
        skill: Skill,
    ) -> Result<PartitionSummary, HarvestError> {
        log::info!("🚀 Harvesting hero {} ({} skill)", hero_id, skill.label());

        let started = Instant::now();
        let mut summary = PartitionSummary::new(hero_id, skill);
        let mut cursor = START_AT_MATCH_ID;

        'pages: loop {
            // A zero quota harvests nothing
            if summary.stored >= self.config.matches_per_partition {
                break;
            }
            let page = match self.api.history(hero_id, skill, cursor).await {
                Ok(page) => page,
                Err(err) => {
                    log::warn!(
                        "⚠️  History fetch failed for hero {}, abandoning partition: {}",
                        hero_id,
                        err
                    );
                    summary.fetch_failed = true;
                    break;
                }
            };
            summary.pages += 1;

            if page.matches.is_empty() {
                break;
            }
            log::debug!(
                "   ├─ Page {}: {} matches, {} remaining upstream",
                summary.pages,
                page.matches.len(),
                page.results_remaining
            );

            let mut min_id = u64::MAX;
            for entry in &page.matches {
                min_id = min_id.min(entry.match_id);
                summary.seen += 1;

                match self.process_match(entry.match_id, skill).await? {
                    MatchOutcome::Stored => summary.stored += 1,
                    MatchOutcome::Duplicate => summary.duplicates += 1,
                    MatchOutcome::Rejected(reason) => summary.rejects.bump(reason),
                    MatchOutcome::FetchSkipped => summary.fetch_skips += 1,
                    MatchOutcome::IntegritySkipped => summary.integrity_skips += 1,
                    MatchOutcome::DeadLettered => summary.dead_letters += 1,
                }

                if summary.stored >= self.config.matches_per_partition {
                    break 'pages;
                }
            }

            if page.results_remaining <= 0 {
                break;
            }
            cursor = min_id.saturating_sub(1);
        }

        summary.elapsed = started.elapsed();
        self.log_summary(&summary);
        Ok(summary)
    }

    /// Take one match from history entry to stored record.
    async fn process_match(
        &mut self,
        listed_id: u64,
        skill: Skill,
    ) -> Result<MatchOutcome, HarvestError> {
        let raw = match self.api.details(listed_id).await {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("⚠️  Details fetch failed for match {}: {}", listed_id, err);
                return Ok(MatchOutcome::FetchSkipped);
            }
        };

        // The payload's own id keys the dedup cache, the store, and
        // the ledger; history listings can alias ids.
        let match_id = match raw.match_id {
            Some(value) => value,
            None => {
                return self.integrity_outcome(IntegrityError::MissingField {
                    field: "match_id",
                })
            }
        };

        let verdict = match filter::classify(&raw) {
            Ok(verdict) => verdict,
            Err(err) => return self.integrity_outcome(err),
        };
        if let Verdict::Reject(reason) = verdict {
            log::debug!("   ├─ Match {} rejected: {}", match_id, reason.as_str());
            return Ok(MatchOutcome::Rejected(reason));
        }

        let start_time = match raw.start_time {
            Some(value) => value,
            None => {
                return self.integrity_outcome(IntegrityError::MissingField {
                    field: "start_time",
                })
            }
        };
        let batch_time = match super::time::batch_time_of(start_time) {
            Some(value) => value,
            None => {
                return self.integrity_outcome(IntegrityError::InvalidStartTime {
                    match_id,
                    value: start_time,
                })
            }
        };

        // Marked before persisting, so a storage dead-letter is not
        // re-attempted when the same id shows up again this run.
        if !self.dedup.insert(batch_time, match_id) {
            log::debug!("   ├─ Match {} already handled this run", match_id);
            return Ok(MatchOutcome::Duplicate);
        }

        let record = match encoder::normalize(&raw, skill) {
            Ok(record) => record,
            Err(HarvestError::Integrity(err)) => return self.integrity_outcome(err),
            Err(other) => return Err(other),
        };

        self.persist_with_retry(&record).await
    }

    /// Store with bounded retries; exhaustion lands in the dead-letter
    /// table and the sweep moves on.
    async fn persist_with_retry(
        &self,
        record: &NormalizedMatch,
    ) -> Result<MatchOutcome, HarvestError> {
        let attempts = self.config.store_retry_limit.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.sink.put(record).await {
                Ok(()) => {
                    self.progress.record_success(record.batch_time)?;
                    log::debug!(
                        "   ├─ Stored match {} in bucket {}",
                        record.match_id,
                        record.batch_time
                    );
                    return Ok(MatchOutcome::Stored);
                }
                Err(err) => {
                    last_error = err.to_string();
                    log::warn!(
                        "⚠️  Store attempt {}/{} failed for match {}: {}",
                        attempt,
                        attempts,
                        record.match_id,
                        err
                    );
                    if attempt < attempts {
                        sleep(Duration::from_millis(self.config.store_retry_delay_ms)).await;
                    }
                }
            }
        }

        log::error!(
            "❌ Dead-lettering match {} after {} attempts: {}",
            record.match_id,
            attempts,
            last_error
        );
        self.progress
            .record_dead_letter(record.match_id, record.batch_time, &last_error)?;
        Ok(MatchOutcome::DeadLettered)
    }

    fn integrity_outcome(&self, err: IntegrityError) -> Result<MatchOutcome, HarvestError> {
        if self.config.halt_on_integrity {
            log::error!("❌ Data integrity violation: {}", err);
            Err(HarvestError::Integrity(err))
        } else {
            log::warn!("⚠️  Skipping match with integrity violation: {}", err);
            Ok(MatchOutcome::IntegritySkipped)
        }
    }

    fn log_summary(&self, summary: &PartitionSummary) {
        log::info!(
            "📊 Partition complete: hero {} ({} skill) in {:.1}s",
            summary.hero_id,
            summary.skill.label(),
            summary.elapsed.as_secs_f64()
        );
        log::info!(
            "   ├─ Pages: {}, seen: {} ({:.1}/min)",
            summary.pages,
            summary.seen,
            summary.matches_per_minute()
        );
        log::info!(
            "   ├─ Stored: {}, duplicates: {}, dead letters: {}",
            summary.stored,
            summary.duplicates,
            summary.dead_letters
        );
        log::info!(
            "   └─ Rejected: {} (mode {}, duration {}, lobby {}, players {}, leaver {}), fetch skips: {}",
            summary.rejects.total(),
            summary.rejects.bad_game_mode,
            summary.rejects.short_duration,
            summary.rejects.bad_lobby,
            summary.rejects.missing_players,
            summary.rejects.leaver,
            summary.fetch_skips
        );
        if summary.fetch_failed {
            log::warn!("⚠️  Partition abandoned after history fetch failure");
        }
    }
}
