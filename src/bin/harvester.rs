//! Harvester - endless match ingestion loop
//!
//! Sweeps every hero in shuffled order, and every skill bracket per
//! hero, storing up to the configured quota of matches per partition.
//! When a sweep finishes it starts over; the per-run dedup cache keeps
//! repeat encounters cheap.
//!
//! Usage:
//!   cargo run --release --bin harvester
//!
//! Environment variables:
//!   STEAM_KEY - Steam Web API key (required)
//!   STEAM_API_BASE - API base URL (default: https://api.steampowered.com)
//!   DOTA_MATCH_DB - sled match store path (default: harvest/matches.sled)
//!   WORKFLOW_DB - SQLite ledger path (default: harvest/workflow.db)
//!   MATCHES_PER_PARTITION - stored-match quota per hero/skill (default: 10)
//!   STORE_RETRY_LIMIT - storage attempts before dead-lettering (default: 3)
//!   STORE_RETRY_DELAY_MS - delay between storage attempts (default: 500)
//!   HALT_ON_INTEGRITY - abort on data integrity errors (default: true)

use std::path::Path;
use std::sync::Arc;

use dotenv::dotenv;
use log::{error, info};
use rand::seq::SliceRandom;

use dotaflow::harvest::{
    meta, HarvestConfig, IngestionDriver, MatchApi, MatchSink, ProgressTracker, Skill,
    SledMatchStore, SteamApiClient,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize environment and logging
    dotenv().ok();
    env_logger::init();

    info!("🚀 Dota 2 Match Harvester");
    info!("   └─ Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match HarvestConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("❌ Configuration error: {}", err);
            return Err(err.into());
        }
    };

    info!("✅ Configuration loaded");
    info!("   ├─ API base: {}", config.api_base);
    info!("   ├─ Match store: {}", config.match_db_path);
    info!("   ├─ Workflow ledger: {}", config.workflow_db_path);
    info!("   ├─ Quota per partition: {}", config.matches_per_partition);
    info!(
        "   ├─ Store retries: {} at {}ms",
        config.store_retry_limit, config.store_retry_delay_ms
    );
    info!("   └─ Halt on integrity error: {}", config.halt_on_integrity);

    // SQLite needs its parent directory to exist
    if let Some(parent) = Path::new(&config.workflow_db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    info!("🔧 Opening stores...");
    let api: Arc<dyn MatchApi> =
        Arc::new(SteamApiClient::new(&config.api_base, &config.steam_key)?);
    let sink: Arc<dyn MatchSink> = Arc::new(SledMatchStore::open(&config.match_db_path)?);
    let progress = ProgressTracker::open(&config.workflow_db_path)?;
    info!("✅ Stores ready");

    let mut driver = IngestionDriver::new(api, sink, progress, config);

    info!("🔄 Press CTRL+C to shutdown gracefully");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut sweep = 0u64;
    let mut total_stored = 0u64;
    let mut total_dead_letters = 0u64;

    loop {
        sweep += 1;
        let mut heroes = meta::hero_ids();
        {
            let mut rng = rand::thread_rng();
            heroes.shuffle(&mut rng);
        }
        info!(
            "🔄 Sweep {}: {} heroes x {} skill brackets",
            sweep,
            heroes.len(),
            Skill::all().len()
        );

        for hero_id in heroes {
            for skill in Skill::all() {
                tokio::select! {
                    _ = &mut ctrl_c => {
                        info!("⚠️  Received CTRL+C, shutting down...");
                        info!("✅ Harvester stopped: {} matches stored this run", total_stored);
                        return Ok(());
                    }
                    result = driver.run_partition(hero_id, skill) => {
                        match result {
                            Ok(summary) => {
                                total_stored += summary.stored;
                                total_dead_letters += summary.dead_letters;
                            }
                            Err(err) => {
                                error!("❌ Harvest halted: {}", err);
                                return Err(err.into());
                            }
                        }
                    }
                }
            }
        }

        info!(
            "✅ Sweep {} complete: {} stored, {} dead letters so far",
            sweep, total_stored, total_dead_letters
        );
    }
}
