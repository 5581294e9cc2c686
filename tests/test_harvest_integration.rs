//! Integration tests for the harvest pipeline
//!
//! Drives the real components end to end against a scripted upstream:
//! actual sled match store, actual SQLite workflow ledger, real filter,
//! encoder, and compression. Only the network edge is canned.

#[cfg(test)]
mod harvest_integration_tests {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tempfile::{NamedTempFile, TempDir};

    use dotaflow::harvest::compress;
    use dotaflow::harvest::features;
    use dotaflow::harvest::fetcher::{MAX_ATTEMPTS, START_AT_MATCH_ID};
    use dotaflow::harvest::meta::NUM_HEROES;
    use dotaflow::harvest::schema::decode_players;
    use dotaflow::harvest::types::{HistoryPage, MatchSummary, RawMatch, RawPlayer};
    use dotaflow::harvest::{
        FetchError, HarvestConfig, IngestionDriver, MatchApi, MatchSink, ProgressTracker, Skill,
        SledMatchStore,
    };

    // 2024-01-01 12:00 and 13:00 UTC
    const HOUR_A: i64 = 1_704_110_400;
    const HOUR_B: i64 = 1_704_114_000;
    const BUCKET_A: i64 = 2024010112;
    const BUCKET_B: i64 = 2024010113;

    fn make_raw_player(slot: u8, hero_id: i32) -> RawPlayer {
        RawPlayer {
            account_id: Some(2_000_000 + slot as i64),
            player_slot: Some(slot),
            hero_id: Some(hero_id),
            item_0: Some(1),
            item_1: Some(2),
            item_2: Some(3),
            item_3: Some(4),
            item_4: Some(5),
            item_5: Some(6),
            backpack_0: Some(0),
            backpack_1: Some(0),
            backpack_2: Some(0),
            kills: Some(7),
            deaths: Some(2),
            assists: Some(11),
            leaver_status: Some(0),
            last_hits: Some(250),
            denies: Some(14),
            gold_per_min: Some(610),
            xp_per_min: Some(700),
            level: Some(25),
            hero_damage: Some(41_000),
            tower_damage: Some(9_000),
            hero_healing: Some(0),
            gold: Some(3_000),
            gold_spent: Some(28_000),
            scaled_hero_damage: Some(36_000),
            scaled_tower_damage: Some(7_500),
            scaled_hero_healing: Some(0),
            ability_upgrades: None,
            additional_units: None,
        }
    }

    fn make_raw_match(match_id: u64, start_time: i64) -> RawMatch {
        let players = (0..10)
            .map(|slot| make_raw_player(slot, slot as i32 + 1))
            .collect();
        RawMatch {
            match_id: Some(match_id),
            start_time: Some(start_time),
            duration: Some(2700),
            game_mode: Some(2),
            lobby_type: Some(7),
            radiant_win: Some(false),
            first_blood_time: Some(40),
            human_players: Some(10),
            leagueid: Some(0),
            cluster: Some(182),
            players: Some(players),
        }
    }

    /// Canned upstream: history pages keyed by cursor, details keyed by
    /// match id. Anything unscripted behaves like an exhausted fetch.
    struct ScriptedApi {
        pages: HashMap<u64, HistoryPage>,
        details: HashMap<u64, RawMatch>,
    }

    impl ScriptedApi {
        fn new() -> Self {
            Self {
                pages: HashMap::new(),
                details: HashMap::new(),
            }
        }

        fn page(mut self, cursor: u64, ids: &[u64], results_remaining: i64) -> Self {
            let matches: Vec<MatchSummary> = ids
                .iter()
                .map(|id| MatchSummary {
                    match_id: *id,
                    start_time: HOUR_A,
                })
                .collect();
            self.pages.insert(
                cursor,
                HistoryPage {
                    status: 1,
                    num_results: matches.len() as i64,
                    total_results: matches.len() as i64,
                    results_remaining,
                    matches,
                },
            );
            self
        }

        fn details(mut self, raw: RawMatch) -> Self {
            self.details.insert(raw.match_id.unwrap(), raw);
            self
        }
    }

    #[async_trait]
    impl MatchApi for ScriptedApi {
        async fn history(
            &self,
            _hero_id: i32,
            _skill: Skill,
            start_at_match_id: u64,
        ) -> Result<HistoryPage, FetchError> {
            Ok(self
                .pages
                .get(&start_at_match_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn details(&self, match_id: u64) -> Result<RawMatch, FetchError> {
            self.details.get(&match_id).cloned().ok_or(FetchError::Exhausted {
                attempts: MAX_ATTEMPTS,
                last_error: "unscripted match".to_string(),
            })
        }
    }

    fn make_test_config() -> HarvestConfig {
        HarvestConfig {
            steam_key: "test".to_string(),
            api_base: "http://127.0.0.1:0".to_string(),
            match_db_path: String::new(),
            workflow_db_path: String::new(),
            matches_per_partition: 50,
            store_retry_limit: 3,
            store_retry_delay_ms: 0,
            halt_on_integrity: true,
        }
    }

    #[tokio::test]
    async fn test_end_to_end_partition_harvest() {
        // 1. Script two pages: three keepers across two hour buckets,
        //    one match too short to keep
        let mut short = make_raw_match(8104, HOUR_A);
        short.duration = Some(600);
        let api = Arc::new(
            ScriptedApi::new()
                .page(START_AT_MATCH_ID, &[8105, 8104, 8103], 1)
                .page(8102, &[8102], 0)
                .details(make_raw_match(8105, HOUR_A))
                .details(short)
                .details(make_raw_match(8103, HOUR_B))
                .details(make_raw_match(8102, HOUR_A)),
        );

        // 2. Real stores in temp locations
        let store_dir = TempDir::new().unwrap();
        let store = Arc::new(SledMatchStore::open(store_dir.path().join("matches.sled")).unwrap());
        let ledger_file = NamedTempFile::new().unwrap();
        let progress =
            ProgressTracker::open(ledger_file.path().to_str().unwrap()).unwrap();

        let sink: Arc<dyn MatchSink> = store.clone();
        let mut driver = IngestionDriver::new(api, sink, progress, make_test_config());

        // 3. Sweep the partition
        let summary = driver.run_partition(11, Skill::VeryHigh).await.unwrap();

        assert_eq!(summary.pages, 2);
        assert_eq!(summary.seen, 4);
        assert_eq!(summary.stored, 3);
        assert_eq!(summary.rejects.short_duration, 1);
        assert_eq!(summary.dead_letters, 0);

        // 4. Records landed under their hour buckets
        assert_eq!(store.len(), 3);
        let record = store.get(BUCKET_A, 8105).unwrap().unwrap();
        assert_eq!(record.match_id, 8105);
        assert_eq!(record.batch_time, BUCKET_A);
        assert_eq!(record.api_skill, 3);
        assert!(!record.radiant_win);
        assert_eq!(record.radiant_heroes, vec![1, 2, 3, 4, 5]);
        assert_eq!(record.dire_heroes, vec![6, 7, 8, 9, 10]);
        assert!(store.get(BUCKET_B, 8103).unwrap().is_some());
        assert!(store.get(BUCKET_A, 8104).unwrap().is_none());

        // 5. The player blob decompresses back to the full roster
        let players = decode_players(&compress::decompress(&record.players_blob).unwrap()).unwrap();
        assert_eq!(players.len(), 10);
        assert_eq!(players[0].account_id, 2_000_000);
        assert_eq!(players[9].player_slot, 9);
        assert_eq!(players[3].gold_per_min, 610);

        // 6. Ledger counts per bucket, no dead letters
        let entry_a = driver.progress().entry(BUCKET_A).unwrap().unwrap();
        assert_eq!(entry_a.fetch, 2);
        let entry_b = driver.progress().entry(BUCKET_B).unwrap().unwrap();
        assert_eq!(entry_b.fetch, 1);
        assert!(driver.progress().dead_letters().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fresh_run_restores_idempotently() {
        let script = || {
            ScriptedApi::new()
                .page(START_AT_MATCH_ID, &[8205], 0)
                .details(make_raw_match(8205, HOUR_A))
        };

        let store_dir = TempDir::new().unwrap();
        let store = Arc::new(SledMatchStore::open(store_dir.path().join("matches.sled")).unwrap());
        let ledger_file = NamedTempFile::new().unwrap();
        let ledger_path = ledger_file.path().to_str().unwrap().to_string();

        // 1. First run stores the match
        let progress = ProgressTracker::open(&ledger_path).unwrap();
        let mut driver = IngestionDriver::new(
            Arc::new(script()),
            store.clone(),
            progress,
            make_test_config(),
        );
        let first = driver.run_partition(11, Skill::Normal).await.unwrap();
        assert_eq!(first.stored, 1);
        drop(driver);

        // 2. A fresh run has an empty dedup cache, so it re-fetches and
        //    re-puts; the store keeps one row per composite key
        let progress = ProgressTracker::open(&ledger_path).unwrap();
        let mut driver = IngestionDriver::new(
            Arc::new(script()),
            store.clone(),
            progress,
            make_test_config(),
        );
        let second = driver.run_partition(11, Skill::Normal).await.unwrap();
        assert_eq!(second.stored, 1);
        assert_eq!(second.duplicates, 0);

        assert_eq!(store.len(), 1);
        let record = store.get(BUCKET_A, 8205).unwrap().unwrap();
        assert_eq!(record.match_id, 8205);

        // Ledger counts both successes
        assert_eq!(driver.progress().entry(BUCKET_A).unwrap().unwrap().fetch, 2);
    }

    #[tokio::test]
    async fn test_stored_roster_feeds_feature_encoding() {
        let api = Arc::new(
            ScriptedApi::new()
                .page(START_AT_MATCH_ID, &[8305], 0)
                .details(make_raw_match(8305, HOUR_A)),
        );
        let store_dir = TempDir::new().unwrap();
        let store = Arc::new(SledMatchStore::open(store_dir.path().join("matches.sled")).unwrap());
        let ledger_file = NamedTempFile::new().unwrap();
        let progress =
            ProgressTracker::open(ledger_file.path().to_str().unwrap()).unwrap();

        let mut driver =
            IngestionDriver::new(api, store.clone(), progress, make_test_config());
        driver.run_partition(11, Skill::High).await.unwrap();

        let record = store.get(BUCKET_A, 8305).unwrap().unwrap();
        assert_eq!(record.hero_flags.count(), 10);

        // Rosters, as stored, encode straight into a training row
        let row = features::match_vector(&record.radiant_heroes, &record.dire_heroes).unwrap();
        assert_eq!(
            row.len(),
            2 * NUM_HEROES + NUM_HEROES * (NUM_HEROES - 1) / 2
        );

        let first_order_nonzero = row[..2 * NUM_HEROES].iter().filter(|v| **v != 0).count();
        assert_eq!(first_order_nonzero, 10);

        // Every radiant hero index is below every dire hero index here,
        // so all 25 cross-team pairs sit in the upper triangle as +1
        let second_order: i32 = row[2 * NUM_HEROES..].iter().map(|v| *v as i32).sum();
        assert_eq!(second_order, 25);
    }
}
