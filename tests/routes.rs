use axum::body::{to_bytes, Body};
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use macro_odds::cache::MarketBook;
use macro_odds::config::Config;
use macro_odds::error::ApiError;
use macro_odds::network::routes::{
    get_market, get_stats, list_markets, market_stats, quote_binary, quote_market,
    resolve_market, router, AppState, BinaryQuoteRequest, ResolveRequest, SharedState,
};
use macro_odds::types::{Direction, OutcomeBucket, PoolUpdate, Wager};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower::ServiceExt;

fn state_with(book: MarketBook, config: Config) -> SharedState {
    Arc::new(AppState::new(Arc::new(RwLock::new(book)), config))
}

fn state() -> SharedState {
    let config = Config::default();
    let mut book = MarketBook::new(config.max_markets, config.base_odds);
    book.seed(0);
    state_with(book, config)
}

fn resolve(actual: f64, bucket: Option<OutcomeBucket>, amount: f64) -> ResolveRequest {
    ResolveRequest { actual, bucket, amount, return_pct: None }
}

#[tokio::test]
async fn lists_seeded_markets() {
    let Json(markets) = list_markets(State(state())).await;
    assert_eq!(markets.len(), 7);
    assert!(markets.windows(2).all(|w| w[0].market_id <= w[1].market_id));
}

#[tokio::test]
async fn unknown_market_is_not_found() {
    let err = get_market(State(state()), Path("nope".to_string())).await.unwrap_err();
    assert!(matches!(err, ApiError::MarketNotFound(id) if id == "nope"));
}

#[tokio::test]
async fn quote_reports_payout_and_stake_check() {
    let state = state();
    let wager = Wager { bucket: Some(OutcomeBucket::Above), amount: 100.0 };
    let Json(resp) = quote_market(State(state.clone()), Path("cpi-mom".to_string()), Json(wager))
        .await
        .unwrap();

    assert!((resp.quote.payout - 140.0).abs() < 1e-9);
    assert!((resp.quote.potential_profit - 40.0).abs() < 1e-9);
    assert!(resp.valid);
    assert_eq!(resp.reason, None);
    assert_eq!(state.stats.read().await.quotes_served, 1);
}

#[tokio::test]
async fn quote_below_minimum_still_computes() {
    let wager = Wager { bucket: Some(OutcomeBucket::Meets), amount: 5.0 };
    let Json(resp) = quote_market(State(state()), Path("core-pce".to_string()), Json(wager))
        .await
        .unwrap();

    assert!((resp.quote.payout - 50.0).abs() < 1e-9);
    assert!(!resp.valid);
    assert!(resp.reason.unwrap().contains("below the minimum"));
}

#[tokio::test]
async fn resolve_pays_the_winning_bucket() {
    let req = resolve(0.5, Some(OutcomeBucket::Above), 100.0);
    let Json(resp) = resolve_market(State(state()), Path("cpi-mom".to_string()), Json(req))
        .await
        .unwrap();

    assert_eq!(resp.winner, OutcomeBucket::Above);
    assert!(resp.won);
    assert!((resp.payout - 140.0).abs() < 1e-9);
}

#[tokio::test]
async fn resolve_loser_gets_nothing() {
    let req = resolve(0.3, Some(OutcomeBucket::Below), 100.0);
    let Json(resp) = resolve_market(State(state()), Path("cpi-mom".to_string()), Json(req))
        .await
        .unwrap();

    assert_eq!(resp.winner, OutcomeBucket::Meets);
    assert!(!resp.won);
    assert_eq!(resp.payout, 0.0);
}

#[tokio::test]
async fn binary_quote_uses_flat_multiplier() {
    let req = BinaryQuoteRequest { direction: Direction::Down, amount: 200.0 };
    let Json(q) = quote_binary(State(state()), Json(req)).await;
    assert!((q.potential_gain - 170.0).abs() < 1e-9);
    assert_eq!(q.multiplier, 1.85);
}

#[tokio::test]
async fn resolve_without_forecast_is_bad_request() {
    let config = Config::default();
    let mut book = MarketBook::new(config.max_markets, config.base_odds);
    book.apply_update(PoolUpdate {
        market_id: "gdp-qoq".to_string(),
        timestamp: 1,
        title: None,
        forecast: None,
        below: 100.0,
        meets: 100.0,
        above: 100.0,
    });
    let state = state_with(book, config);

    let req = resolve(1.0, None, 0.0);
    let err = resolve_market(State(state), Path("gdp-qoq".to_string()), Json(req))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(msg) if msg.contains("no forecast")));
}

#[tokio::test]
async fn resolve_with_return_feeds_scenario_stats() {
    let state = state();
    for return_pct in [0.4, -0.2, 0.6] {
        let mut req = resolve(0.5, None, 0.0);
        req.return_pct = Some(return_pct);
        resolve_market(State(state.clone()), Path("cpi-mom".to_string()), Json(req))
            .await
            .unwrap();
    }

    let Json(stats) = market_stats(State(state), Path("cpi-mom".to_string())).await.unwrap();
    let above = stats
        .scenarios
        .iter()
        .find(|row| row.scenario == OutcomeBucket::Above)
        .unwrap();
    assert_eq!(above.count, 3);
    assert_eq!(above.up_count, 2);
    assert_eq!(above.up_prob, 66.67);
    assert_eq!(above.down_prob, 33.33);
    assert!((above.avg_move - 0.4).abs() < 1e-9);
    let others = stats.scenarios.iter().filter(|r| r.scenario != OutcomeBucket::Above);
    assert!(others.map(|r| r.count).all(|count| count == 0));
}

#[tokio::test]
async fn resolve_reports_direction() {
    let mut req = resolve(0.1, None, 0.0);
    req.return_pct = Some(-0.5);
    let Json(resp) = resolve_market(State(state()), Path("cpi-mom".to_string()), Json(req))
        .await
        .unwrap();
    assert_eq!(resp.winner, OutcomeBucket::Below);
    assert_eq!(resp.direction, Some(Direction::Down));
}

#[tokio::test]
async fn stats_are_live_without_feed_traffic() {
    let state = state();
    tokio::time::sleep(Duration::from_millis(1100)).await;
    let wager = Wager { bucket: None, amount: 20.0 };
    quote_market(State(state.clone()), Path("cpi-mom".to_string()), Json(wager))
        .await
        .unwrap();

    let stats = state.current_stats().await;
    assert_eq!(stats.markets_count, 7);
    assert!(stats.uptime_seconds >= 1);
    assert_eq!(stats.quotes_served, 1);
    assert_eq!(stats.updates_per_second, 0.0);

    let response = get_stats(State(state)).await.into_response();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn fresh_update_rate_is_reported() {
    let state = state();
    state.record_update_rate(40, 12.5).await;
    let stats = state.current_stats().await;
    assert_eq!(stats.updates_received, 40);
    assert_eq!(stats.updates_per_second, 12.5);
}

#[tokio::test]
async fn router_serves_quote_path() {
    let app = router(state());
    let request = Request::builder()
        .method("POST")
        .uri("/markets/cpi-mom/quote")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"bucket":"above","amount":100}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["market_id"], "cpi-mom");
    assert_eq!(body["payout"], 140.0);
    assert_eq!(body["valid"], true);
}

#[tokio::test]
async fn router_maps_unknown_market_to_404() {
    let request = Request::builder().uri("/markets/nope/stats").body(Body::empty()).unwrap();
    let response = router(state()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
