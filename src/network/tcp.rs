use crate::types::{PoolUpdate, PoolUpdateError};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed pool record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("rejected pool record: {0}")]
    Rejected(#[from] PoolUpdateError),
}

/// Decode one feed line. Blank lines (keep-alives) yield `Ok(None)`.
pub fn parse_pool_line(line: &str) -> Result<Option<PoolUpdate>, FeedError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let update: PoolUpdate = serde_json::from_str(line)?;
    update.validate()?;
    Ok(Some(update))
}

/// Start TCP listener for the pool-state feed
pub async fn start_tcp_listener(
    port: u16,
    tx: broadcast::Sender<PoolUpdate>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    info!("📡 Pool feed listening on {}", addr);
    serve(listener, tx).await;
    Ok(())
}

pub async fn serve(listener: TcpListener, tx: broadcast::Sender<PoolUpdate>) {
    loop {
        match listener.accept().await {
            Ok((socket, addr)) => {
                tokio::spawn(read_feed(socket, addr, tx.clone()));
            }
            Err(e) => {
                error!("Pool feed accept failed: {}", e);
            }
        }
    }
}

/// Forward every valid record from one feed connection
async fn read_feed(socket: TcpStream, addr: SocketAddr, tx: broadcast::Sender<PoolUpdate>) {
    info!("🔗 Pool feed connected: {}", addr);
    let mut lines = BufReader::new(socket).lines();
    let (mut accepted, mut rejected) = (0u64, 0u64);

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Pool feed {} read error: {}", addr, e);
                break;
            }
        };
        match parse_pool_line(&line) {
            Ok(Some(update)) => {
                accepted += 1;
                // No receivers only happens during shutdown
                let _ = tx.send(update);
            }
            Ok(None) => {}
            Err(e) => {
                rejected += 1;
                warn!("Pool feed {}: {}", addr, e);
            }
        }
    }

    info!("🔌 Pool feed {} closed ({} accepted, {} rejected)", addr, accepted, rejected);
}
