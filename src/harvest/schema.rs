//! Fixed storage schema for normalized matches
//!
//! The variable-shape player objects from the API are flattened into
//! [`PlayerRecord`]: 29 named numeric fields plus two ordered
//! sub-record lists (ability upgrades, summoned-unit inventories).
//! The schema is fixed and flat; there is no versioning or evolution.
//! `postcard` gives the compact binary encoding, and the round trip is
//! exact: `decode_players(encode_players(x)) == x` for any valid input
//! including zero, one or many sub-records.
//!
//! [`NormalizedMatch`] is the value committed to the match store, keyed
//! by the composite `"{batch_time}_{match_id}"` key.

use serde::{Deserialize, Serialize};

use super::meta;

/// Compose the key that identifies one ingestion attempt. Shared by
/// the dedup cache and the match store so the two can never disagree.
pub fn composite_key(batch_time: i64, match_id: u64) -> String {
    format!("{}_{}", batch_time, match_id)
}

/// One player flattened to the fixed 29-field schema.
///
/// Field order follows the upstream payload. `account_id` is 64-bit
/// because anonymized players report 4294967295.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub account_id: i64,
    pub player_slot: u8,
    pub hero_id: i32,
    pub item_0: i32,
    pub item_1: i32,
    pub item_2: i32,
    pub item_3: i32,
    pub item_4: i32,
    pub item_5: i32,
    pub backpack_0: i32,
    pub backpack_1: i32,
    pub backpack_2: i32,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub leaver_status: i32,
    pub last_hits: i32,
    pub denies: i32,
    pub gold_per_min: i32,
    pub xp_per_min: i32,
    pub level: i32,
    pub hero_damage: i32,
    pub tower_damage: i32,
    pub hero_healing: i32,
    pub gold: i32,
    pub gold_spent: i32,
    pub scaled_hero_damage: i32,
    pub scaled_tower_damage: i32,
    pub scaled_hero_healing: i32,
    /// Ordered as upstream reported them; empty when absent.
    pub ability_upgrades: Vec<AbilityUpgrade>,
    /// Ordered as upstream reported them; almost always empty.
    pub additional_units: Vec<AdditionalUnit>,
}

/// One ability-upgrade event (which ability, at what game time, at
/// what hero level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityUpgrade {
    pub ability: i32,
    pub time: i32,
    pub level: i32,
}

/// Inventory of a summoned unit: exactly 6 item slots and 3 backpack
/// slots, same layout as the owning player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalUnit {
    pub unit_name: String,
    pub item_0: i32,
    pub item_1: i32,
    pub item_2: i32,
    pub item_3: i32,
    pub item_4: i32,
    pub item_5: i32,
    pub backpack_0: i32,
    pub backpack_1: i32,
    pub backpack_2: i32,
}

/// Serialize a player list to the fixed binary form.
pub fn encode_players(players: &[PlayerRecord]) -> Result<Vec<u8>, postcard::Error> {
    postcard::to_allocvec(players)
}

/// Inverse of [`encode_players`].
pub fn decode_players(bytes: &[u8]) -> Result<Vec<PlayerRecord>, postcard::Error> {
    postcard::from_bytes(bytes)
}

/// Per-hero presence bitmask, indexed by hero id.
///
/// 256 bits covers the id space with room to spare; an id outside it
/// would already have failed the hero-table lookup upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroFlagSet {
    words: [u64; 4],
}

impl HeroFlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, hero_id: i32) {
        if let Some((word, bit)) = Self::position(hero_id) {
            self.words[word] |= 1 << bit;
        }
    }

    pub fn contains(&self, hero_id: i32) -> bool {
        match Self::position(hero_id) {
            Some((word, bit)) => self.words[word] & (1 << bit) != 0,
            None => false,
        }
    }

    pub fn count(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Hero ids currently set, ascending.
    pub fn ids(&self) -> Vec<i32> {
        let mut out = Vec::with_capacity(self.count() as usize);
        for (w, word) in self.words.iter().enumerate() {
            let mut bits = *word;
            while bits != 0 {
                let bit = bits.trailing_zeros();
                out.push((w as u32 * 64 + bit) as i32);
                bits &= bits - 1;
            }
        }
        out
    }

    /// Slugs of the set heroes, for log lines. Ids without a table
    /// entry are skipped.
    pub fn slugs(&self) -> Vec<&'static str> {
        self.ids().into_iter().filter_map(meta::hero_slug).collect()
    }

    fn position(hero_id: i32) -> Option<(usize, u32)> {
        if !(0..256).contains(&hero_id) {
            return None;
        }
        Some(((hero_id / 64) as usize, (hero_id % 64) as u32))
    }
}

/// A match after filtering, encoding and compression: the unit of
/// durable storage. Incidental scalars stay optional; required ones
/// were already enforced during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMatch {
    pub match_id: u64,
    /// Hour bucket `YYYYMMDDHH` derived from `start_time` (UTC).
    pub batch_time: i64,
    pub start_time: i64,
    pub duration: i64,
    pub game_mode: i64,
    pub lobby_type: i64,
    /// Skill bracket the history query asked for; the details payload
    /// does not echo it.
    pub api_skill: u8,
    /// Max leaver status across players at encode time.
    pub calc_leaver: i32,
    pub radiant_win: bool,
    pub first_blood_time: Option<i64>,
    pub human_players: Option<i64>,
    pub leagueid: Option<i64>,
    pub cluster: Option<i64>,
    /// Hero ids by side, roster order, for the downstream pairing and
    /// feature-encoding stages.
    pub radiant_heroes: Vec<i32>,
    pub dire_heroes: Vec<i32>,
    pub hero_flags: HeroFlagSet,
    /// xz-compressed [`encode_players`] output.
    pub players_blob: Vec<u8>,
}

impl NormalizedMatch {
    /// Key this record lives under in the match store.
    pub fn store_key(&self) -> String {
        composite_key(self.batch_time, self.match_id)
    }
}
