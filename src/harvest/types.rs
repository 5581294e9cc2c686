//! Typed views of the upstream match API payloads
//!
//! Two endpoints feed the pipeline:
//! - `GetMatchHistory`: paged summaries for one hero/skill partition
//! - `GetMatchDetails`: the full record for a single match id
//!
//! Every field that the pipeline later requires is `Option` here.
//! Requiredness is enforced downstream (filter, encoder) so that a
//! missing field surfaces as a named [`IntegrityError`] instead of a
//! deserialization failure or a silent default. Unknown payload fields
//! are ignored.
//!
//! [`IntegrityError`]: super::error::IntegrityError

use serde::Deserialize;

/// Envelope around the history endpoint's `result` object.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    pub result: HistoryPage,
}

/// One page of match summaries for a hero/skill partition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryPage {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub num_results: i64,
    #[serde(default)]
    pub total_results: i64,
    /// Matches older than this page that the upstream still holds.
    /// Zero means the partition is exhausted.
    #[serde(default)]
    pub results_remaining: i64,
    #[serde(default)]
    pub matches: Vec<MatchSummary>,
}

/// Summary entry in a history page. Only the id drives the pipeline;
/// the start time is kept for logging.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchSummary {
    pub match_id: u64,
    #[serde(default)]
    pub start_time: i64,
}

/// Envelope around the details endpoint's `result` object.
#[derive(Debug, Clone, Deserialize)]
pub struct DetailsResponse {
    pub result: RawMatch,
}

/// One match-details payload, untrusted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMatch {
    pub match_id: Option<u64>,
    pub start_time: Option<i64>,
    pub duration: Option<i64>,
    pub game_mode: Option<i64>,
    pub lobby_type: Option<i64>,
    pub radiant_win: Option<bool>,
    pub first_blood_time: Option<i64>,
    pub human_players: Option<i64>,
    pub leagueid: Option<i64>,
    pub cluster: Option<i64>,
    pub players: Option<Vec<RawPlayer>>,
}

impl RawMatch {
    /// Largest `leaver_status` across players, 0 when none report one.
    /// Bot entries legitimately omit the field.
    pub fn max_leaver_status(&self) -> i32 {
        self.players
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|p| p.leaver_status)
            .max()
            .unwrap_or(0)
    }
}

/// One player object from a details payload, untrusted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlayer {
    pub account_id: Option<i64>,
    pub player_slot: Option<u8>,
    pub hero_id: Option<i32>,
    pub item_0: Option<i32>,
    pub item_1: Option<i32>,
    pub item_2: Option<i32>,
    pub item_3: Option<i32>,
    pub item_4: Option<i32>,
    pub item_5: Option<i32>,
    pub backpack_0: Option<i32>,
    pub backpack_1: Option<i32>,
    pub backpack_2: Option<i32>,
    pub kills: Option<i32>,
    pub deaths: Option<i32>,
    pub assists: Option<i32>,
    pub leaver_status: Option<i32>,
    pub last_hits: Option<i32>,
    pub denies: Option<i32>,
    pub gold_per_min: Option<i32>,
    pub xp_per_min: Option<i32>,
    pub level: Option<i32>,
    pub hero_damage: Option<i32>,
    pub tower_damage: Option<i32>,
    pub hero_healing: Option<i32>,
    pub gold: Option<i32>,
    pub gold_spent: Option<i32>,
    pub scaled_hero_damage: Option<i32>,
    pub scaled_tower_damage: Option<i32>,
    pub scaled_hero_healing: Option<i32>,
    pub ability_upgrades: Option<Vec<RawAbilityUpgrade>>,
    pub additional_units: Option<Vec<RawAdditionalUnit>>,
}

impl RawPlayer {
    /// True for the `{}` placeholder entries the upstream emits when a
    /// slot never connected.
    pub fn is_empty(&self) -> bool {
        self.player_slot.is_none() && self.hero_id.is_none() && self.account_id.is_none()
    }
}

/// One ability-upgrade event, untrusted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAbilityUpgrade {
    pub ability: Option<i32>,
    pub time: Option<i32>,
    pub level: Option<i32>,
}

/// One summoned-unit inventory (Lone Druid's bear, Arc Warden's
/// tempest double), untrusted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAdditionalUnit {
    pub unitname: Option<String>,
    pub item_0: Option<i32>,
    pub item_1: Option<i32>,
    pub item_2: Option<i32>,
    pub item_3: Option<i32>,
    pub item_4: Option<i32>,
    pub item_5: Option<i32>,
    pub backpack_0: Option<i32>,
    pub backpack_1: Option<i32>,
    pub backpack_2: Option<i32>,
}
