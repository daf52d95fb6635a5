use crate::calculations::outcome::DEFAULT_MEETS_TOLERANCE;
use crate::types::{BaseOdds, Money, PerBucket};
use std::env;
use std::str::FromStr;
use tracing::warn;

#[derive(Clone, Debug)]
pub struct Config {
    pub tcp_port: u16,
    pub http_port: u16,
    pub max_markets: usize,
    pub min_stake: Money,
    pub available_balance: Money,
    pub base_odds: BaseOdds,
    pub meets_tolerance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tcp_port: 9000,
            http_port: 8081,
            max_markets: 1000,
            min_stake: 10.0,
            available_balance: 12_450.0,
            base_odds: BaseOdds::standard(),
            meets_tolerance: DEFAULT_MEETS_TOLERANCE,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tcp_port: var_or("TCP_PORT", defaults.tcp_port),
            http_port: var_or("HTTP_PORT", defaults.http_port),
            max_markets: var_or("MAX_MARKETS", defaults.max_markets),
            min_stake: var_or("MIN_STAKE", defaults.min_stake),
            available_balance: var_or("AVAILABLE_BALANCE", defaults.available_balance),
            base_odds: PerBucket::new(
                var_or("BASE_ODDS_BELOW", defaults.base_odds.below),
                var_or("BASE_ODDS_MEETS", defaults.base_odds.meets),
                var_or("BASE_ODDS_ABOVE", defaults.base_odds.above),
            ),
            meets_tolerance: positive_or(
                var_or("MEETS_TOLERANCE", defaults.meets_tolerance),
                DEFAULT_MEETS_TOLERANCE,
            ),
        }
    }
}

fn var_or<T: FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => parse_or(key, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T: FromStr + std::fmt::Display>(key: &str, raw: &str, default: T) -> T {
    raw.trim().parse().unwrap_or_else(|_| {
        warn!("Invalid {} '{}', defaulting to {}", key, raw, default);
        default
    })
}

fn positive_or(value: f64, default: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        default
    }
}
