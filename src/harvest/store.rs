//! Durable match store
//!
//! Normalized matches land in an embedded sled tree keyed by the
//! composite `"{batch_time}_{match_id}"` key, postcard-encoded. A put
//! is synchronous from the driver's point of view (one record per
//! call, flushed before returning) and idempotent: re-persisting the
//! same key overwrites the previous value byte-for-byte.
//!
//! [`MatchSink`] is the seam the driver writes through, so tests can
//! substitute a failing or recording sink; [`SledMatchStore`] is the
//! production implementation.

use std::path::Path;

use async_trait::async_trait;

use super::error::StoreError;
use super::schema::{composite_key, NormalizedMatch};

/// Write side of the match store.
#[async_trait]
pub trait MatchSink: Send + Sync {
    /// Persist one normalized match under its composite key.
    ///
    /// Must be durable when it returns Ok and safe to repeat for the
    /// same record.
    async fn put(&self, record: &NormalizedMatch) -> Result<(), StoreError>;
}

/// sled-backed store.
pub struct SledMatchStore {
    db: sled::Db,
}

impl SledMatchStore {
    /// Open (creating if needed) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Read one record back, `None` when the key is absent.
    pub fn get(
        &self,
        batch_time: i64,
        match_id: u64,
    ) -> Result<Option<NormalizedMatch>, StoreError> {
        let key = composite_key(batch_time, match_id);
        match self.db.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(postcard::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Number of stored matches.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

#[async_trait]
impl MatchSink for SledMatchStore {
    async fn put(&self, record: &NormalizedMatch) -> Result<(), StoreError> {
        let key = record.store_key();
        let value = postcard::to_allocvec(record)?;
        self.db.insert(key.as_bytes(), value)?;
        self.db.flush_async().await?;
        Ok(())
    }
}
