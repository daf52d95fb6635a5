use macro_odds::cache::MarketBook;
use macro_odds::config::Config;
use macro_odds::network::routes::{router, AppState, SharedState};
use macro_odds::network::tcp;
use macro_odds::types::PoolUpdate;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, RwLock};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    dotenvy::dotenv().ok();

    info!("🚀 Starting macro-odds...");

    let config = Config::from_env();
    info!(
        "Base odds below={} meets={} above={}, min stake {}",
        config.base_odds.below, config.base_odds.meets, config.base_odds.above, config.min_stake
    );

    // Market book, seeded with the demo pools
    let book = {
        let mut book = MarketBook::new(config.max_markets, config.base_odds);
        book.seed(chrono::Utc::now().timestamp_millis());
        Arc::new(RwLock::new(book))
    };

    let (update_tx, _) = broadcast::channel::<PoolUpdate>(1000);
    let state: SharedState = Arc::new(AppState::new(book.clone(), config.clone()));

    // Start TCP listener for the pool feed
    let tcp_tx = update_tx.clone();
    let tcp_port = config.tcp_port;
    tokio::spawn(async move {
        if let Err(e) = tcp::start_tcp_listener(tcp_port, tcp_tx).await {
            error!("TCP listener error: {}", e);
        }
    });

    // Process updates
    let process_book = book.clone();
    let process_state = state.clone();
    let mut update_rx = update_tx.subscribe();

    tokio::spawn(async move {
        let mut updates_count: u64 = 0;
        let mut last_updates_count: u64 = 0;
        let mut last_stats_update = Instant::now();

        loop {
            let update = match update_rx.recv().await {
                Ok(update) => update,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    error!("Pool update processor lagged, skipped {} updates", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            updates_count += 1;

            {
                let mut book = process_book.write().await;
                if let Some(entry) = book.apply_update(update) {
                    info!(
                        "📈 {} odds below={} meets={} above={}",
                        entry.market_id, entry.odds.below, entry.odds.meets, entry.odds.above
                    );
                }
            }

            // Update rate every second
            if last_stats_update.elapsed().as_secs() >= 1 {
                let now = Instant::now();
                let elapsed = now.duration_since(last_stats_update).as_secs_f64();
                let updates_delta = updates_count - last_updates_count;
                process_state
                    .record_update_rate(updates_count, updates_delta as f64 / elapsed)
                    .await;

                last_stats_update = now;
                last_updates_count = updates_count;
            }
        }
    });

    let app = router(state).layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.http_port);
    info!("🌐 HTTP server starting on {}", addr);
    info!("✅ macro-odds ready!");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
