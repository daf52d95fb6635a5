use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Monetary amount in quote currency units
pub type Money = f64;

/// Wager direction against a forecast value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeBucket {
    Below,
    Meets,
    Above,
}

impl OutcomeBucket {
    pub const ALL: [OutcomeBucket; 3] =
        [OutcomeBucket::Below, OutcomeBucket::Meets, OutcomeBucket::Above];
}

impl fmt::Display for OutcomeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OutcomeBucket::Below => "below",
            OutcomeBucket::Meets => "meets",
            OutcomeBucket::Above => "above",
        };
        f.write_str(label)
    }
}

/// One value per outcome bucket
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerBucket<T> {
    pub below: T,
    pub meets: T,
    pub above: T,
}

impl<T> PerBucket<T> {
    pub fn new(below: T, meets: T, above: T) -> Self {
        Self { below, meets, above }
    }

    pub fn get(&self, bucket: OutcomeBucket) -> &T {
        match bucket {
            OutcomeBucket::Below => &self.below,
            OutcomeBucket::Meets => &self.meets,
            OutcomeBucket::Above => &self.above,
        }
    }

    pub fn get_mut(&mut self, bucket: OutcomeBucket) -> &mut T {
        match bucket {
            OutcomeBucket::Below => &mut self.below,
            OutcomeBucket::Meets => &mut self.meets,
            OutcomeBucket::Above => &mut self.above,
        }
    }

    pub fn map<U, F: FnMut(OutcomeBucket, &T) -> U>(&self, mut f: F) -> PerBucket<U> {
        PerBucket {
            below: f(OutcomeBucket::Below, &self.below),
            meets: f(OutcomeBucket::Meets, &self.meets),
            above: f(OutcomeBucket::Above, &self.above),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (OutcomeBucket, &T)> {
        OutcomeBucket::ALL.into_iter().map(move |b| (b, self.get(b)))
    }
}

/// Amount wagered on a bucket and its share of the whole pool (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BucketPool {
    pub amount: Money,
    pub percentage: f64,
}

pub type PoolSnapshot = PerBucket<BucketPool>;

/// Fixed per-bucket difficulty multiplier
pub type BaseOdds = PerBucket<f64>;

/// Effective per-bucket multiplier after pool adjustment
pub type ComputedOdds = PerBucket<f64>;

impl PoolSnapshot {
    /// Build a snapshot from wagered amounts, deriving each bucket's share.
    /// An empty pool has a 0% share everywhere.
    pub fn from_amounts(below: Money, meets: Money, above: Money) -> Self {
        let total = below + meets + above;
        let share = |amount: Money| if total > 0.0 { amount / total * 100.0 } else { 0.0 };
        PerBucket::new(
            BucketPool { amount: below, percentage: share(below) },
            BucketPool { amount: meets, percentage: share(meets) },
            BucketPool { amount: above, percentage: share(above) },
        )
    }

    /// Build a snapshot from percentage shares alone (amounts unknown)
    pub fn from_shares(below: f64, meets: f64, above: f64) -> Self {
        PerBucket::new(
            BucketPool { amount: 0.0, percentage: below },
            BucketPool { amount: 0.0, percentage: meets },
            BucketPool { amount: 0.0, percentage: above },
        )
    }
}

impl BaseOdds {
    pub fn standard() -> Self {
        PerBucket::new(2.5, 4.0, 1.8)
    }
}

/// A proposed stake. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wager {
    #[serde(default)]
    pub bucket: Option<OutcomeBucket>,
    pub amount: Money,
}

/// Binary panel direction (OVER / UNDER)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

/// Pool state pushed by an external pool-state source, one JSON object per line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolUpdate {
    pub market_id: String,
    pub timestamp: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub forecast: Option<f64>,
    pub below: Money,
    pub meets: Money,
    pub above: Money,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoolUpdateError {
    #[error("market_id is empty")]
    MissingMarketId,
    #[error("{bucket} amount {amount} is not a non-negative number")]
    InvalidAmount { bucket: OutcomeBucket, amount: Money },
    #[error("forecast must be a finite number")]
    InvalidForecast,
}

impl PoolUpdate {
    /// Reject records that would produce a meaningless pool split
    pub fn validate(&self) -> Result<(), PoolUpdateError> {
        if self.market_id.trim().is_empty() {
            return Err(PoolUpdateError::MissingMarketId);
        }
        let amounts = PerBucket::new(self.below, self.meets, self.above);
        for (bucket, &amount) in amounts.iter() {
            if !(amount.is_finite() && amount >= 0.0) {
                return Err(PoolUpdateError::InvalidAmount { bucket, amount });
            }
        }
        if self.forecast.is_some_and(|f| !f.is_finite()) {
            return Err(PoolUpdateError::InvalidForecast);
        }
        Ok(())
    }
}

/// Stats for monitoring
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceStats {
    pub markets_count: usize,
    pub updates_received: u64,
    pub updates_per_second: f64,
    pub quotes_served: u64,
    pub uptime_seconds: u64,
}
