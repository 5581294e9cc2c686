//! Error taxonomy for the harvest pipeline
//!
//! Failure classes map to how the driver reacts:
//! - [`FetchError`]: upstream flakiness, exhausted its retry schedule.
//!   Never fatal; the affected cycle is skipped and counted.
//! - [`IntegrityError`]: the payload violates the upstream contract
//!   (unmapped enum value, missing required field). Halts the run by
//!   default since continuing would bias the stored dataset.
//! - [`StoreError`]: durable-store failure. Retried a bounded number of
//!   times, then dead-lettered; the run continues.
//! - [`ProgressError`]: local ledger failure. Fatal; the ledger is on
//!   local disk and a broken ledger makes counts meaningless.
//!
//! Filter rejections are not errors at all; see
//! [`Verdict`](super::filter::Verdict).

use thiserror::Error;

/// Terminal outcome of a fetch after the retry schedule ran out, or a
/// body that failed to decode on a success status.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("retry schedule exhausted after {attempts} attempts, last error: {last_error}")]
    Exhausted { attempts: usize, last_error: String },

    /// A success status carried an undecodable body. Not retried:
    /// the payload is deterministic, another attempt returns the same
    /// bytes.
    #[error("malformed response body: {0}")]
    Decode(String),
}

/// The payload broke the upstream contract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("match {match_id}: game mode {mode} has no known mapping")]
    UnmappedGameMode { match_id: u64, mode: i64 },

    #[error("required field `{field}` missing from payload")]
    MissingField { field: &'static str },

    #[error("match {match_id}: unknown hero id {hero_id}")]
    UnknownHero { match_id: u64, hero_id: i32 },

    #[error("match {match_id}: start_time {value} outside representable range")]
    InvalidStartTime { match_id: u64, value: i64 },
}

/// Durable match-store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("record serialization failed: {0}")]
    Serialize(#[from] postcard::Error),
}

/// Local workflow-ledger failure.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("workflow ledger error: {0}")]
    Db(#[from] rusqlite::Error),
}

/// Lossless compression failure (corrupt input on the decode side).
#[derive(Debug, Error)]
#[error("compression error: {0}")]
pub struct CompressError(#[from] std::io::Error);

/// Top-level error for driver entry points.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error(transparent)]
    Compress(#[from] CompressError),

    #[error("player schema serialization failed: {0}")]
    Schema(#[from] postcard::Error),
}
