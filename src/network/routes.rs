use crate::cache::{MarketBook, MarketEntry};
use crate::calculations::binary::{binary_quote, BinaryQuote};
use crate::calculations::odds::{quote, WagerQuote};
use crate::calculations::outcome::{realized_payout, resolve_bucket};
use crate::calculations::scenario_stats::{scenario_rows, ScenarioRow};
use crate::calculations::stake::validate_stake;
use crate::config::Config;
use crate::error::ApiError;
use crate::types::{Direction, Money, OutcomeBucket, ServiceStats, Wager};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, warn};

pub type SharedState = Arc<AppState>;

/// An update rate older than this is reported as zero
const RATE_STALE_AFTER: Duration = Duration::from_secs(5);

pub struct AppState {
    pub book: Arc<RwLock<MarketBook>>,
    pub stats: RwLock<ServiceStats>,
    pub config: Config,
    started: Instant,
    rate_sampled_at: RwLock<Option<Instant>>,
}

impl AppState {
    pub fn new(book: Arc<RwLock<MarketBook>>, config: Config) -> Self {
        Self {
            book,
            stats: RwLock::new(ServiceStats::default()),
            config,
            started: Instant::now(),
            rate_sampled_at: RwLock::new(None),
        }
    }

    async fn record_quote(&self) {
        let mut stats = self.stats.write().await;
        stats.quotes_served += 1;
    }

    /// Called by the update processor with its running totals
    pub async fn record_update_rate(&self, updates_received: u64, updates_per_second: f64) {
        let mut stats = self.stats.write().await;
        stats.updates_received = updates_received;
        stats.updates_per_second = updates_per_second;
        *self.rate_sampled_at.write().await = Some(Instant::now());
    }

    /// Stats as of now: uptime and market count are read live, and an update
    /// rate that has not been refreshed recently reads as zero
    pub async fn current_stats(&self) -> ServiceStats {
        let mut stats = self.stats.read().await.clone();
        stats.markets_count = self.book.read().await.len();
        stats.uptime_seconds = self.started.elapsed().as_secs();

        let fresh = self
            .rate_sampled_at
            .read()
            .await
            .is_some_and(|at| at.elapsed() < RATE_STALE_AFTER);
        if !fresh {
            stats.updates_per_second = 0.0;
        }
        stats
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/markets", get(list_markets))
        .route("/markets/:id", get(get_market))
        .route("/markets/:id/quote", post(quote_market))
        .route("/markets/:id/resolve", post(resolve_market))
        .route("/markets/:id/stats", get(market_stats))
        .route("/binary/quote", post(quote_binary))
        .route("/stats", get(get_stats))
        .with_state(state)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub market_id: String,
    #[serde(flatten)]
    pub quote: WagerQuote,
    pub min_stake: Money,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub computed_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveRequest {
    pub actual: f64,
    #[serde(default)]
    pub bucket: Option<OutcomeBucket>,
    #[serde(default)]
    pub amount: Money,
    /// Asset return after the release; recorded against the winning scenario
    #[serde(default)]
    pub return_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub market_id: String,
    pub forecast: f64,
    pub actual: f64,
    pub winner: OutcomeBucket,
    pub won: bool,
    pub payout: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketStatsResponse {
    pub market_id: String,
    pub title: String,
    pub scenarios: Vec<ScenarioRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BinaryQuoteRequest {
    pub direction: Direction,
    pub amount: Money,
}

/// All markets with their current odds
pub async fn list_markets(State(state): State<SharedState>) -> Json<Vec<MarketEntry>> {
    let book = state.book.read().await;
    Json(book.sorted().into_iter().cloned().collect())
}

pub async fn get_market(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<MarketEntry>, ApiError> {
    let book = state.book.read().await;
    book.get(&id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::MarketNotFound(id))
}

/// Odds and projected payout for a proposed wager.
/// The quote is always computed; stake problems are reported alongside it.
pub async fn quote_market(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(wager): Json<Wager>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let wager_quote = {
        let book = state.book.read().await;
        let entry = book.get(&id).ok_or_else(|| ApiError::MarketNotFound(id.clone()))?;
        quote(&entry.snapshot, book.base_odds(), &wager)
    };

    let config = &state.config;
    let check = validate_stake(wager.amount, config.min_stake, config.available_balance);
    if let Err(e) = &check {
        warn!("Quote on {} with invalid stake: {}", id, e);
    }
    state.record_quote().await;

    Ok(Json(QuoteResponse {
        market_id: id,
        quote: wager_quote,
        min_stake: state.config.min_stake,
        valid: check.is_ok(),
        reason: check.err().map(|e| e.to_string()),
        computed_at: chrono::Utc::now().timestamp_millis(),
    }))
}

/// Classify a published figure against the market's forecast and report what
/// the given wager would have paid at current odds. A supplied return is
/// folded into the winning scenario's reaction stats.
pub async fn resolve_market(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, ApiError> {
    if !req.actual.is_finite() {
        return Err(ApiError::BadRequest("actual must be a finite number".to_string()));
    }
    if req.return_pct.is_some_and(|r| !r.is_finite()) {
        return Err(ApiError::BadRequest("return_pct must be a finite number".to_string()));
    }

    let mut book = state.book.write().await;
    let entry = book.get(&id).ok_or_else(|| ApiError::MarketNotFound(id.clone()))?;
    let forecast = entry
        .forecast
        .ok_or_else(|| ApiError::BadRequest(format!("market {} has no forecast", id)))?;

    let winner = resolve_bucket(forecast, req.actual, state.config.meets_tolerance);
    let wager = Wager { bucket: req.bucket, amount: req.amount };
    let payout = realized_payout(&entry.odds, &wager, winner);
    let direction = match req.return_pct {
        Some(return_pct) => book.record_reaction(&id, winner, return_pct).flatten(),
        None => None,
    };
    info!("🏁 Market {} resolved {} (forecast {}, actual {})", id, winner, forecast, req.actual);

    Ok(Json(ResolveResponse {
        market_id: id,
        forecast,
        actual: req.actual,
        winner,
        won: req.bucket == Some(winner),
        payout,
        direction,
    }))
}

/// Per-scenario reaction table for one market
pub async fn market_stats(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<MarketStatsResponse>, ApiError> {
    let book = state.book.read().await;
    let entry = book.get(&id).ok_or_else(|| ApiError::MarketNotFound(id.clone()))?;
    Ok(Json(MarketStatsResponse {
        market_id: entry.market_id.clone(),
        title: entry.title.clone(),
        scenarios: scenario_rows(&entry.reactions),
    }))
}

pub async fn quote_binary(
    State(state): State<SharedState>,
    Json(req): Json<BinaryQuoteRequest>,
) -> Json<BinaryQuote> {
    state.record_quote().await;
    Json(binary_quote(req.direction, req.amount))
}

/// Get current stats
pub async fn get_stats(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.current_stats().await)
}
