//! # Match harvest pipeline
//!
//! Pulls ranked match history from the Steam Web API one hero/skill
//! partition at a time and lands clean, compact records in local
//! storage:
//!
//! 1. Page summaries backwards from the newest match id
//! 2. Fetch full details per match, on a fixed retry schedule
//! 3. Filter out modes, lobbies, and leavers that poison training data
//! 4. Deduplicate within the run by hour bucket and match id
//! 5. Flatten players to a fixed schema, xz the blob
//! 6. Persist idempotently to sled, dead-lettering on repeated failure
//! 7. Tally per-hour progress in a SQLite ledger
//!
//! ## Module Organization
//!
//! - `types` - Untrusted payload views of the upstream endpoints
//! - `meta` - Hero table, game mode names, skill brackets
//! - `time` - Hour-bucket arithmetic (`batch_time`)
//! - `error` - Error taxonomy for every stage
//! - `fetcher` - Rate-limited Steam API client, `MatchApi` trait
//! - `filter` - Accept/reject rules for raw matches
//! - `schema` - Storable record types and the composite key
//! - `encoder` - Raw payload to fixed-schema normalization
//! - `compress` - xz helpers for the player blob
//! - `dedup` - Per-run seen-set
//! - `store` - `MatchSink` trait and the sled store
//! - `progress` - Workflow ledger and dead letters
//! - `driver` - Partition sweep orchestration
//! - `config` - Environment-driven runtime configuration
//! - `features` - One-hot roster encodings for model training

pub mod compress;
pub mod config;
pub mod dedup;
pub mod driver;
pub mod encoder;
pub mod error;
pub mod features;
pub mod fetcher;
pub mod filter;
pub mod meta;
pub mod progress;
pub mod schema;
pub mod store;
pub mod time;
pub mod types;

// Re-export the assembly surface the binary and tests use
pub use config::HarvestConfig;
pub use dedup::DedupCache;
pub use driver::{IngestionDriver, PartitionSummary, RejectCounts};
pub use error::{FetchError, HarvestError, IntegrityError, StoreError};
pub use fetcher::{MatchApi, SteamApiClient};
pub use meta::Skill;
pub use progress::ProgressTracker;
pub use schema::NormalizedMatch;
pub use store::{MatchSink, SledMatchStore};
