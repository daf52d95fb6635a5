// Pool-adjusted odds and payout calculation

use crate::types::{BaseOdds, ComputedOdds, Money, OutcomeBucket, PoolSnapshot, Wager};
use serde::{Deserialize, Serialize};

/// Condition on a bucket's pool share (percent)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    AtMost(f64),
    AtLeast(f64),
}

impl Threshold {
    fn matches(&self, percentage: f64) -> bool {
        match *self {
            Threshold::AtMost(limit) => percentage <= limit,
            Threshold::AtLeast(limit) => percentage >= limit,
        }
    }
}

/// Evaluated top-down, first match wins. The `<=` rules come before the `>=`
/// rules and the ranges are not a partition, so order is part of the behavior.
pub const ADJUSTMENT_RULES: &[(Threshold, f64)] = &[
    (Threshold::AtMost(10.0), 5.0),
    (Threshold::AtMost(20.0), 2.5),
    (Threshold::AtMost(30.0), 1.5),
    (Threshold::AtLeast(60.0), 0.6),
    (Threshold::AtLeast(50.0), 0.8),
];

/// Multiplier used when no rule matches. Shares outside [0, 100] (and NaN)
/// get it too rather than being rejected.
pub const DEFAULT_ADJUSTMENT: f64 = 1.0;

/// Scale factor for a bucket holding `percentage` of the pool.
/// Crowded buckets pay less, thin buckets pay more.
pub fn pool_adjustment(percentage: f64) -> f64 {
    if !(0.0..=100.0).contains(&percentage) {
        return DEFAULT_ADJUSTMENT;
    }
    ADJUSTMENT_RULES
        .iter()
        .find(|(threshold, _)| threshold.matches(percentage))
        .map(|&(_, multiplier)| multiplier)
        .unwrap_or(DEFAULT_ADJUSTMENT)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Effective odds per bucket: `base * pool_adjustment(share)`, rounded to 1 dp.
///
/// Never fails: malformed shares degrade to the default multiplier.
pub fn compute_odds(pool: &PoolSnapshot, base: &BaseOdds) -> ComputedOdds {
    pool.map(|bucket, share| round_to(base.get(bucket) * pool_adjustment(share.percentage), 1))
}

/// Projected payout for a stake on `bucket`, rounded to 2 dp.
/// No bucket selected pays nothing. The amount is not validated here.
pub fn compute_payout(odds: &ComputedOdds, bucket: Option<OutcomeBucket>, amount: Money) -> Money {
    match bucket {
        Some(bucket) => round_to(amount * odds.get(bucket), 2),
        None => 0.0,
    }
}

/// Everything the wager summary shows for one stake
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WagerQuote {
    pub odds: ComputedOdds,
    pub bucket: Option<OutcomeBucket>,
    pub amount: Money,
    pub selected_odds: Option<f64>,
    pub payout: Money,
    pub potential_profit: Money,
}

pub fn quote(pool: &PoolSnapshot, base: &BaseOdds, wager: &Wager) -> WagerQuote {
    let odds = compute_odds(pool, base);
    let payout = compute_payout(&odds, wager.bucket, wager.amount);
    let potential_profit = match wager.bucket {
        Some(_) => round_to(payout - wager.amount, 2),
        None => 0.0,
    };

    WagerQuote {
        selected_odds: wager.bucket.map(|b| *odds.get(b)),
        odds,
        bucket: wager.bucket,
        amount: wager.amount,
        payout,
        potential_profit,
    }
}
