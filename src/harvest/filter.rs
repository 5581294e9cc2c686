//! Match inclusion rules
//!
//! Five independent rules decide whether a fetched match enters the
//! dataset. All must pass; the first violation wins and is reported as
//! a reason-coded [`Verdict::Reject`], which is an expected outcome and
//! never an error. Two conditions are different in kind and surface as
//! [`IntegrityError`] instead: a `game_mode` id missing from the mode
//! table, and a required scalar missing from the payload. Both mean
//! the upstream contract changed under us.
//!
//! [`IntegrityError`]: super::error::IntegrityError

use super::error::IntegrityError;
use super::meta;
use super::types::RawMatch;

/// Matches shorter than this are discarded (aborted games, practice
/// stubs).
pub const MIN_DURATION_SECS: i64 = 1200;

/// Lobby types excluded from harvesting: invalid (-1), co-op with
/// bots (4), 1v1 mid (8).
pub const EXCLUDED_LOBBIES: [i64; 3] = [-1, 4, 8];

/// Highest tolerated `leaver_status`: 0 = finished, 1 = left after a
/// safe point. Anything above is an abandon.
pub const MAX_LEAVER_STATUS: i32 = 1;

/// Why a match was excluded. `as_str` values are stable and appear in
/// logs and per-partition counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    BadGameMode,
    ShortDuration,
    BadLobby,
    MissingPlayers,
    Leaver,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::BadGameMode => "bad_game_mode",
            RejectReason::ShortDuration => "short_duration",
            RejectReason::BadLobby => "bad_lobby",
            RejectReason::MissingPlayers => "missing_players",
            RejectReason::Leaver => "leaver",
        }
    }
}

/// Outcome of classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

/// Apply the inclusion rules to one raw match.
///
/// Rules run in the order listed below; the first violation wins.
pub fn classify(raw: &RawMatch) -> Result<Verdict, IntegrityError> {
    let match_id = raw
        .match_id
        .ok_or(IntegrityError::MissingField { field: "match_id" })?;

    // Rule 1: eligible game mode. An id the table does not know is an
    // integrity failure, not a reject.
    let mode = raw
        .game_mode
        .ok_or(IntegrityError::MissingField { field: "game_mode" })?;
    let mode_name =
        meta::mode_name(mode).ok_or(IntegrityError::UnmappedGameMode { match_id, mode })?;
    if !meta::ALLOWED_GAME_MODES.contains(&mode_name) {
        return Ok(Verdict::Reject(RejectReason::BadGameMode));
    }

    // Rule 2: minimum duration.
    let duration = raw
        .duration
        .ok_or(IntegrityError::MissingField { field: "duration" })?;
    if duration < MIN_DURATION_SECS {
        return Ok(Verdict::Reject(RejectReason::ShortDuration));
    }

    // Rule 3: eligible lobby.
    let lobby = raw
        .lobby_type
        .ok_or(IntegrityError::MissingField { field: "lobby_type" })?;
    if EXCLUDED_LOBBIES.contains(&lobby) {
        return Ok(Verdict::Reject(RejectReason::BadLobby));
    }

    // Rule 4: full roster, no placeholder entries.
    let players = raw
        .players
        .as_deref()
        .ok_or(IntegrityError::MissingField { field: "players" })?;
    if players.is_empty() || players.iter().any(|p| p.is_empty()) {
        return Ok(Verdict::Reject(RejectReason::MissingPlayers));
    }

    // Rule 5: nobody abandoned. Missing per-player leaver fields are
    // tolerated (bots).
    if raw.max_leaver_status() > MAX_LEAVER_STATUS {
        return Ok(Verdict::Reject(RejectReason::Leaver));
    }

    Ok(Verdict::Accept)
}
