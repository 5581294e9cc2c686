//! Rate-limited match API client
//!
//! The upstream API throttles aggressively and fails sporadically.
//! Every request runs under a fixed escalating sleep schedule: the
//! first entry is the routine per-request pacing, the late entries
//! ride out multi-minute outages. At most [`MAX_ATTEMPTS`] tries per
//! request; exhaustion surfaces as [`FetchError::Exhausted`], which
//! callers treat as a skipped cycle, never a crash.
//!
//! [`MatchApi`] is the seam the driver consumes; [`SteamApiClient`] is
//! the production implementation over HTTPS.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use super::error::FetchError;
use super::meta::Skill;
use super::types::{DetailsResponse, HistoryPage, HistoryResponse, RawMatch};

/// Seconds slept before each attempt, in order.
pub const SLEEP_SCHEDULE: [f64; 11] = [
    0.05, 0.1, 1.0, 10.0, 30.0, 60.0, 300.0, 500.0, 1000.0, 2000.0, 6000.0,
];

/// One attempt per schedule entry.
pub const MAX_ATTEMPTS: usize = SLEEP_SCHEDULE.len();

/// Cursor value that starts a partition at the newest matches.
pub const START_AT_MATCH_ID: u64 = 9_999_999_999;

const DEFAULT_API_BASE: &str = "https://api.steampowered.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Walks the fixed sleep schedule. Each call to [`wait`](Self::wait)
/// sleeps the next entry; once the schedule is spent it returns
/// [`ScheduleExhausted`] without sleeping.
#[derive(Debug, Default)]
pub struct FetchBackoff {
    attempt: usize,
}

/// The fixed schedule ran out.
#[derive(Debug, thiserror::Error)]
#[error("sleep schedule exhausted")]
pub struct ScheduleExhausted;

impl FetchBackoff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay before attempt `attempt` (0-based), `None` past the end.
    pub fn delay_for(attempt: usize) -> Option<Duration> {
        SLEEP_SCHEDULE.get(attempt).map(|s| Duration::from_secs_f64(*s))
    }

    /// Attempts already granted.
    pub fn attempts_used(&self) -> usize {
        self.attempt
    }

    pub async fn wait(&mut self) -> Result<(), ScheduleExhausted> {
        let delay = Self::delay_for(self.attempt).ok_or(ScheduleExhausted)?;
        if self.attempt > 0 {
            log::warn!(
                "⏳ Attempt {} of {} in {:?}",
                self.attempt + 1,
                MAX_ATTEMPTS,
                delay
            );
        }
        sleep(delay).await;
        self.attempt += 1;
        Ok(())
    }
}

/// The two upstream queries the driver needs. Implemented by
/// [`SteamApiClient`] in production and by scripted doubles in tests.
#[async_trait]
pub trait MatchApi: Send + Sync {
    /// One page of match summaries for a hero/skill partition, newest
    /// first, starting at `start_at_match_id` and walking backwards.
    async fn history(
        &self,
        hero_id: i32,
        skill: Skill,
        start_at_match_id: u64,
    ) -> Result<HistoryPage, FetchError>;

    /// Full details for a single match.
    async fn details(&self, match_id: u64) -> Result<RawMatch, FetchError>;
}

/// What a single attempt produced, before retry classification.
enum AttemptError {
    /// Transport failure or non-success status; retry per schedule.
    Retryable(String),
    /// Success status with an undecodable body; retrying cannot help.
    Decode(String),
}

/// HTTPS client for the IDOTA2Match endpoints.
pub struct SteamApiClient {
    http: reqwest::Client,
    api_base: String,
    key: String,
}

impl SteamApiClient {
    /// `api_base` is overridable for tests against a local stub;
    /// production passes the configured default.
    pub fn new(api_base: &str, key: &str) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    pub fn default_api_base() -> &'static str {
        DEFAULT_API_BASE
    }

    async fn try_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, AttemptError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AttemptError::Retryable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AttemptError::Retryable(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AttemptError::Decode(e.to_string()))
    }

    /// Run one query under the sleep schedule. `what` labels log lines;
    /// the URL itself is never logged because it carries the API key.
    async fn get_with_schedule<T: DeserializeOwned>(
        &self,
        url: String,
        what: &str,
    ) -> Result<T, FetchError> {
        let mut backoff = FetchBackoff::new();
        let mut last_error = String::from("no attempt made");
        loop {
            if backoff.wait().await.is_err() {
                log::error!(
                    "❌ Giving up on {} after {} attempts: {}",
                    what,
                    MAX_ATTEMPTS,
                    last_error
                );
                return Err(FetchError::Exhausted {
                    attempts: MAX_ATTEMPTS,
                    last_error,
                });
            }
            match self.try_get::<T>(&url).await {
                Ok(value) => return Ok(value),
                Err(AttemptError::Retryable(message)) => {
                    log::warn!("⚠️  Fetch attempt failed for {}: {}", what, message);
                    last_error = message;
                }
                Err(AttemptError::Decode(message)) => {
                    log::error!("❌ Undecodable body for {}: {}", what, message);
                    return Err(FetchError::Decode(message));
                }
            }
        }
    }
}

#[async_trait]
impl MatchApi for SteamApiClient {
    async fn history(
        &self,
        hero_id: i32,
        skill: Skill,
        start_at_match_id: u64,
    ) -> Result<HistoryPage, FetchError> {
        let url = format!(
            "{}/IDOTA2Match_570/GetMatchHistory/V001/?key={}&skill={}&hero_id={}&start_at_match_id={}",
            self.api_base,
            self.key,
            skill.as_u8(),
            hero_id,
            start_at_match_id
        );
        let label = format!("history hero {} skill {}", hero_id, skill.label());
        let response: HistoryResponse = self.get_with_schedule(url, &label).await?;
        Ok(response.result)
    }

    async fn details(&self, match_id: u64) -> Result<RawMatch, FetchError> {
        let url = format!(
            "{}/IDOTA2Match_570/GetMatchDetails/V001/?key={}&match_id={}",
            self.api_base, self.key, match_id
        );
        let label = format!("details match {}", match_id);
        let response: DetailsResponse = self.get_with_schedule(url, &label).await?;
        Ok(response.result)
    }
}
