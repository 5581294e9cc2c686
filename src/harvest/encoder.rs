//! Raw-to-fixed-schema encoding
//!
//! [`encode_player`] copies the 29 scalar fields verbatim from a raw
//! player object into a [`PlayerRecord`]. Every one of them is
//! required: a missing field raises [`IntegrityError::MissingField`]
//! naming the field, never a silent default. The two sub-record lists
//! (ability upgrades, summoned-unit inventories) are optional at the
//! match level but fully required within each entry.
//!
//! [`normalize`] drives the per-player encoding for a whole accepted
//! match and assembles the storable [`NormalizedMatch`]: side rosters,
//! hero presence flags, leaver summary, hour bucket, and the
//! compressed player blob.

use super::compress;
use super::error::{HarvestError, IntegrityError};
use super::meta::{self, Skill};
use super::schema::{
    AbilityUpgrade, AdditionalUnit, HeroFlagSet, NormalizedMatch, PlayerRecord,
};
use super::time;
use super::types::{RawMatch, RawPlayer};

/// Which team a player fought for, derived from the slot number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Radiant,
    Dire,
}

impl Side {
    /// Slots 0-4 are radiant, everything above is dire.
    pub fn from_slot(player_slot: u8) -> Side {
        if player_slot <= 4 {
            Side::Radiant
        } else {
            Side::Dire
        }
    }
}

fn req<T>(value: Option<T>, field: &'static str) -> Result<T, IntegrityError> {
    value.ok_or(IntegrityError::MissingField { field })
}

/// Flatten one raw player to the fixed 29-field schema.
///
/// `match_id` is only used to attribute integrity failures.
pub fn encode_player(raw: &RawPlayer, match_id: u64) -> Result<PlayerRecord, IntegrityError> {
    let hero_id = req(raw.hero_id, "hero_id")?;
    if meta::hero_slug(hero_id).is_none() {
        return Err(IntegrityError::UnknownHero { match_id, hero_id });
    }

    let ability_upgrades = match raw.ability_upgrades.as_deref() {
        Some(list) => list
            .iter()
            .map(|a| {
                Ok(AbilityUpgrade {
                    ability: req(a.ability, "ability")?,
                    time: req(a.time, "time")?,
                    level: req(a.level, "level")?,
                })
            })
            .collect::<Result<Vec<_>, IntegrityError>>()?,
        None => Vec::new(),
    };

    let additional_units = match raw.additional_units.as_deref() {
        Some(list) => list
            .iter()
            .map(|u| {
                Ok(AdditionalUnit {
                    unit_name: req(u.unitname.clone(), "unitname")?,
                    item_0: req(u.item_0, "item_0")?,
                    item_1: req(u.item_1, "item_1")?,
                    item_2: req(u.item_2, "item_2")?,
                    item_3: req(u.item_3, "item_3")?,
                    item_4: req(u.item_4, "item_4")?,
                    item_5: req(u.item_5, "item_5")?,
                    backpack_0: req(u.backpack_0, "backpack_0")?,
                    backpack_1: req(u.backpack_1, "backpack_1")?,
                    backpack_2: req(u.backpack_2, "backpack_2")?,
                })
            })
            .collect::<Result<Vec<_>, IntegrityError>>()?,
        None => Vec::new(),
    };

    Ok(PlayerRecord {
        account_id: req(raw.account_id, "account_id")?,
        player_slot: req(raw.player_slot, "player_slot")?,
        hero_id,
        item_0: req(raw.item_0, "item_0")?,
        item_1: req(raw.item_1, "item_1")?,
        item_2: req(raw.item_2, "item_2")?,
        item_3: req(raw.item_3, "item_3")?,
        item_4: req(raw.item_4, "item_4")?,
        item_5: req(raw.item_5, "item_5")?,
        backpack_0: req(raw.backpack_0, "backpack_0")?,
        backpack_1: req(raw.backpack_1, "backpack_1")?,
        backpack_2: req(raw.backpack_2, "backpack_2")?,
        kills: req(raw.kills, "kills")?,
        deaths: req(raw.deaths, "deaths")?,
        assists: req(raw.assists, "assists")?,
        leaver_status: req(raw.leaver_status, "leaver_status")?,
        last_hits: req(raw.last_hits, "last_hits")?,
        denies: req(raw.denies, "denies")?,
        gold_per_min: req(raw.gold_per_min, "gold_per_min")?,
        xp_per_min: req(raw.xp_per_min, "xp_per_min")?,
        level: req(raw.level, "level")?,
        hero_damage: req(raw.hero_damage, "hero_damage")?,
        tower_damage: req(raw.tower_damage, "tower_damage")?,
        hero_healing: req(raw.hero_healing, "hero_healing")?,
        gold: req(raw.gold, "gold")?,
        gold_spent: req(raw.gold_spent, "gold_spent")?,
        scaled_hero_damage: req(raw.scaled_hero_damage, "scaled_hero_damage")?,
        scaled_tower_damage: req(raw.scaled_tower_damage, "scaled_tower_damage")?,
        scaled_hero_healing: req(raw.scaled_hero_healing, "scaled_hero_healing")?,
        ability_upgrades,
        additional_units,
    })
}

/// Encode and compress an accepted match into its storable form.
///
/// Callers run [`classify`](super::filter::classify) first; this
/// function re-checks nothing the filter already enforced, but still
/// fails on fields the encoding itself needs.
pub fn normalize(raw: &RawMatch, skill: Skill) -> Result<NormalizedMatch, HarvestError> {
    let match_id = req(raw.match_id, "match_id")?;
    let start_time = req(raw.start_time, "start_time")?;
    let batch_time = time::batch_time_of(start_time).ok_or(IntegrityError::InvalidStartTime {
        match_id,
        value: start_time,
    })?;
    let players_raw = raw
        .players
        .as_deref()
        .ok_or(IntegrityError::MissingField { field: "players" })?;

    let mut records = Vec::with_capacity(players_raw.len());
    let mut radiant_heroes = Vec::new();
    let mut dire_heroes = Vec::new();
    let mut hero_flags = HeroFlagSet::new();

    for raw_player in players_raw {
        let record = encode_player(raw_player, match_id)?;
        match Side::from_slot(record.player_slot) {
            Side::Radiant => radiant_heroes.push(record.hero_id),
            Side::Dire => dire_heroes.push(record.hero_id),
        }
        hero_flags.set(record.hero_id);
        records.push(record);
    }

    let encoded = super::schema::encode_players(&records)?;
    let players_blob = compress::compress(&encoded)?;

    Ok(NormalizedMatch {
        match_id,
        batch_time,
        start_time,
        duration: req(raw.duration, "duration")?,
        game_mode: req(raw.game_mode, "game_mode")?,
        lobby_type: req(raw.lobby_type, "lobby_type")?,
        api_skill: skill.as_u8(),
        calc_leaver: raw.max_leaver_status(),
        radiant_win: req(raw.radiant_win, "radiant_win")?,
        first_blood_time: raw.first_blood_time,
        human_players: raw.human_players,
        leagueid: raw.leagueid,
        cluster: raw.cluster,
        radiant_heroes,
        dire_heroes,
        hero_flags,
        players_blob,
    })
}
