use crate::calculations::odds::compute_odds;
use crate::calculations::scenario_stats::ReactionStats;
use crate::types::{BaseOdds, ComputedOdds, Direction, OutcomeBucket, PoolSnapshot, PoolUpdate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Latest pool state for a single market, with odds derived from it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketEntry {
    pub market_id: String,
    pub title: String,
    pub forecast: Option<f64>,
    pub snapshot: PoolSnapshot,
    pub odds: ComputedOdds,
    pub last_update: i64,
    #[serde(default)]
    pub reactions: ReactionStats,
}

pub struct MarketBook {
    pub markets: HashMap<String, MarketEntry>,
    // (timestamp, market_id) -> ()
    // Ordered by timestamp, so first entry is oldest
    eviction_queue: BTreeMap<(i64, String), ()>,
    max_markets: usize,
    base_odds: BaseOdds,
}

impl MarketBook {
    pub fn new(max_markets: usize, base_odds: BaseOdds) -> Self {
        Self {
            markets: HashMap::new(),
            eviction_queue: BTreeMap::new(),
            max_markets,
            base_odds,
        }
    }

    pub fn base_odds(&self) -> &BaseOdds {
        &self.base_odds
    }

    /// Replace a market's pool snapshot and recompute its odds
    pub fn apply_update(&mut self, update: PoolUpdate) -> Option<&MarketEntry> {
        let snapshot = PoolSnapshot::from_amounts(update.below, update.meets, update.above);
        self.insert_snapshot(
            update.market_id,
            update.title,
            update.forecast,
            snapshot,
            update.timestamp,
        )
    }

    pub fn insert_snapshot(
        &mut self,
        market_id: String,
        title: Option<String>,
        forecast: Option<f64>,
        snapshot: PoolSnapshot,
        timestamp: i64,
    ) -> Option<&MarketEntry> {
        if self.max_markets == 0 {
            return None;
        }

        // Check if we need to evict (only if new market and at capacity)
        if !self.markets.contains_key(&market_id) && self.markets.len() >= self.max_markets {
            self.evict_oldest();
        }

        if let Some(existing) = self.markets.get(&market_id) {
            self.eviction_queue.remove(&(existing.last_update, market_id.clone()));
        }

        let odds = compute_odds(&snapshot, &self.base_odds);
        let entry = self.markets.entry(market_id.clone()).or_insert_with(|| MarketEntry {
            market_id: market_id.clone(),
            title: market_id.clone(),
            forecast: None,
            snapshot,
            odds,
            last_update: timestamp,
            reactions: ReactionStats::default(),
        });

        // Title and forecast persist across updates that omit them
        if let Some(title) = title {
            entry.title = title;
        }
        if forecast.is_some() {
            entry.forecast = forecast;
        }
        entry.snapshot = snapshot;
        entry.odds = odds;
        entry.last_update = timestamp;

        debug!(
            "Market {} odds below={} meets={} above={}",
            entry.market_id, entry.odds.below, entry.odds.meets, entry.odds.above
        );

        self.eviction_queue.insert((timestamp, market_id.clone()), ());
        self.markets.get(&market_id)
    }

    pub fn get(&self, market_id: &str) -> Option<&MarketEntry> {
        self.markets.get(market_id)
    }

    /// Record how the asset moved after a release that landed in `scenario`.
    /// Returns `None` when the market is unknown, else the resolved direction.
    pub fn record_reaction(
        &mut self,
        market_id: &str,
        scenario: OutcomeBucket,
        return_pct: f64,
    ) -> Option<Option<Direction>> {
        let entry = self.markets.get_mut(market_id)?;
        let direction = entry.reactions.get_mut(scenario).record(return_pct);
        info!(
            "📊 {} {} scenario: {} occurrences, avg move {:.4}",
            market_id,
            scenario,
            entry.reactions.get(scenario).occurrence_count,
            entry.reactions.get(scenario).avg_move
        );
        Some(direction)
    }

    /// Markets ordered by id, for stable listings
    pub fn sorted(&self) -> Vec<&MarketEntry> {
        let mut entries: Vec<&MarketEntry> = self.markets.values().collect();
        entries.sort_by(|a, b| a.market_id.cmp(&b.market_id));
        entries
    }

    /// Remove oldest market by timestamp
    fn evict_oldest(&mut self) {
        if let Some((_, market_id)) = self.eviction_queue.pop_first().map(|(key, _)| key) {
            info!("🗑️ Evicting market {} (book full)", market_id);
            self.markets.remove(&market_id);
        }
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    /// Load the demo markets: calendar releases, each with the same mocked pool split
    pub fn seed(&mut self, timestamp: i64) {
        let seeded = [
            ("cpi-mom", "Consumer Price Index (CPI) MoM", 0.3),
            ("retail-sales-mom", "Retail Sales (MoM)", 0.4),
            ("building-permits", "Building Permits", 1.45),
            ("jobless-claims", "Initial Jobless Claims", 205.0),
            ("philly-fed", "Philadelphia Fed Manufacturing", -3.0),
            ("existing-home-sales", "Existing Home Sales", 3.9),
            ("core-pce", "Core PCE Price Index", 0.2),
        ];
        for (id, title, forecast) in seeded {
            self.insert_snapshot(
                id.to_string(),
                Some(title.to_string()),
                Some(forecast),
                PoolSnapshot::from_shares(25.0, 20.0, 55.0),
                timestamp,
            );
        }
        info!("🌱 Seeded {} demo markets", seeded.len());
    }
}
