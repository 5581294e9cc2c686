//! Static game metadata: mode tables, hero tables, skill brackets
//!
//! The upstream API reports `game_mode` and `hero_id` as raw integers.
//! Everything downstream (filtering, presence flags, feature vectors)
//! goes through the lookup tables here, so an id the tables do not know
//! is detected at the ingestion boundary instead of corrupting stored
//! data silently.

/// Game modes eligible for harvesting. Anything else is rejected.
pub const ALLOWED_GAME_MODES: [&str; 6] = [
    "All Pick",
    "Captains Mode",
    "Random Draft",
    "Single Draft",
    "All Random",
    "Least Played",
];

/// Map a raw `game_mode` id to its display name.
///
/// `None` means the id is unknown to this build, which callers must
/// treat as a data-integrity failure rather than a routine reject.
pub fn mode_name(mode: i64) -> Option<&'static str> {
    let name = match mode {
        0 => "Unknown",
        1 => "All Pick",
        2 => "Captains Mode",
        3 => "Random Draft",
        4 => "Single Draft",
        5 => "All Random",
        6 => "Intro",
        7 => "Diretide",
        8 => "Reverse Captains Mode",
        9 => "Greeviling",
        10 => "Tutorial",
        11 => "Mid Only",
        12 => "Least Played",
        13 => "Limited Heroes",
        14 => "Compendium Matchmaking",
        15 => "Custom",
        16 => "Captains Draft",
        17 => "Balanced Draft",
        18 => "Ability Draft",
        19 => "Event",
        20 => "All Random Deathmatch",
        21 => "1v1 Mid",
        22 => "All Draft",
        23 => "Turbo",
        24 => "Mutation",
        _ => return None,
    };
    Some(name)
}

/// Hero roster, ordered by id. Ids are not contiguous (Valve skips
/// numbers), so position in this table is the canonical dense index
/// used by the feature encoder.
pub const HEROES: &[(i32, &str)] = &[
    (1, "anti-mage"),
    (2, "axe"),
    (3, "bane"),
    (4, "bloodseeker"),
    (5, "crystal-maiden"),
    (6, "drow-ranger"),
    (7, "earthshaker"),
    (8, "juggernaut"),
    (9, "mirana"),
    (10, "morphling"),
    (11, "shadow-fiend"),
    (12, "phantom-lancer"),
    (13, "puck"),
    (14, "pudge"),
    (15, "razor"),
    (16, "sand-king"),
    (17, "storm-spirit"),
    (18, "sven"),
    (19, "tiny"),
    (20, "vengeful-spirit"),
    (21, "windranger"),
    (22, "zeus"),
    (23, "kunkka"),
    (25, "lina"),
    (26, "lion"),
    (27, "shadow-shaman"),
    (28, "slardar"),
    (29, "tidehunter"),
    (30, "witch-doctor"),
    (31, "lich"),
    (32, "riki"),
    (33, "enigma"),
    (34, "tinker"),
    (35, "sniper"),
    (36, "necrophos"),
    (37, "warlock"),
    (38, "beastmaster"),
    (39, "queen-of-pain"),
    (40, "venomancer"),
    (41, "faceless-void"),
    (42, "wraith-king"),
    (43, "death-prophet"),
    (44, "phantom-assassin"),
    (45, "pugna"),
    (46, "templar-assassin"),
    (47, "viper"),
    (48, "luna"),
    (49, "dragon-knight"),
    (50, "dazzle"),
    (51, "clockwerk"),
    (52, "leshrac"),
    (53, "natures-prophet"),
    (54, "lifestealer"),
    (55, "dark-seer"),
    (56, "clinkz"),
    (57, "omniknight"),
    (58, "enchantress"),
    (59, "huskar"),
    (60, "night-stalker"),
    (61, "broodmother"),
    (62, "bounty-hunter"),
    (63, "weaver"),
    (64, "jakiro"),
    (65, "batrider"),
    (66, "chen"),
    (67, "spectre"),
    (68, "ancient-apparition"),
    (69, "doom"),
    (70, "ursa"),
    (71, "spirit-breaker"),
    (72, "gyrocopter"),
    (73, "alchemist"),
    (74, "invoker"),
    (75, "silencer"),
    (76, "outworld-destroyer"),
    (77, "lycan"),
    (78, "brewmaster"),
    (79, "shadow-demon"),
    (80, "lone-druid"),
    (81, "chaos-knight"),
    (82, "meepo"),
    (83, "treant-protector"),
    (84, "ogre-magi"),
    (85, "undying"),
    (86, "rubick"),
    (87, "disruptor"),
    (88, "nyx-assassin"),
    (89, "naga-siren"),
    (90, "keeper-of-the-light"),
    (91, "io"),
    (92, "visage"),
    (93, "slark"),
    (94, "medusa"),
    (95, "troll-warlord"),
    (96, "centaur-warrunner"),
    (97, "magnus"),
    (98, "timbersaw"),
    (99, "bristleback"),
    (100, "tusk"),
    (101, "skywrath-mage"),
    (102, "abaddon"),
    (103, "elder-titan"),
    (104, "legion-commander"),
    (105, "techies"),
    (106, "ember-spirit"),
    (107, "earth-spirit"),
    (108, "underlord"),
    (109, "terrorblade"),
    (110, "phoenix"),
    (111, "oracle"),
    (112, "winter-wyvern"),
    (113, "arc-warden"),
    (114, "monkey-king"),
    (119, "dark-willow"),
    (120, "pangolier"),
    (121, "grimstroke"),
    (123, "hoodwink"),
    (126, "void-spirit"),
    (128, "snapfire"),
    (129, "mars"),
    (131, "ringmaster"),
    (135, "dawnbreaker"),
    (136, "marci"),
    (137, "primal-beast"),
    (138, "muerta"),
    (145, "kez"),
];

/// Number of known heroes; also the width of one side of the
/// first-order feature vector.
pub const NUM_HEROES: usize = HEROES.len();

/// Slug for a hero id, e.g. 1 → "anti-mage". `None` for unknown ids.
pub fn hero_slug(hero_id: i32) -> Option<&'static str> {
    HEROES
        .binary_search_by_key(&hero_id, |(id, _)| *id)
        .ok()
        .map(|idx| HEROES[idx].1)
}

/// Dense index of a hero id in [`HEROES`], used for feature vectors.
pub fn hero_index(hero_id: i32) -> Option<usize> {
    HEROES.binary_search_by_key(&hero_id, |(id, _)| *id).ok()
}

/// All known hero ids, in table order.
pub fn hero_ids() -> Vec<i32> {
    HEROES.iter().map(|(id, _)| *id).collect()
}

/// Skill bracket as defined by the match-history API's `skill` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Skill {
    Normal,
    High,
    VeryHigh,
}

impl Skill {
    /// Wire value for the `skill` query parameter.
    pub fn as_u8(self) -> u8 {
        match self {
            Skill::Normal => 1,
            Skill::High => 2,
            Skill::VeryHigh => 3,
        }
    }

    /// All brackets in ascending order, the order partitions are polled.
    pub fn all() -> [Skill; 3] {
        [Skill::Normal, Skill::High, Skill::VeryHigh]
    }

    pub fn label(self) -> &'static str {
        match self {
            Skill::Normal => "normal",
            Skill::High => "high",
            Skill::VeryHigh => "very-high",
        }
    }
}
