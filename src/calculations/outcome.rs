// Outcome resolution against a published figure

use crate::calculations::odds::compute_payout;
use crate::types::{ComputedOdds, Direction, Money, OutcomeBucket, Wager};

/// Return below this magnitude counts as a flat move
pub const FLAT_RETURN_THRESHOLD: f64 = 0.0001;

/// Band used around the forecast when no positive tolerance is configured
pub const DEFAULT_MEETS_TOLERANCE: f64 = 0.0001;

/// Which bucket a published `actual` falls in relative to `forecast`.
/// Anything within `tolerance` of the forecast meets it; a tolerance that is
/// not positive means `DEFAULT_MEETS_TOLERANCE`.
pub fn resolve_bucket(forecast: f64, actual: f64, tolerance: f64) -> OutcomeBucket {
    let tolerance = if tolerance > 0.0 { tolerance } else { DEFAULT_MEETS_TOLERANCE };
    if actual > forecast + tolerance {
        OutcomeBucket::Above
    } else if actual < forecast - tolerance {
        OutcomeBucket::Below
    } else {
        OutcomeBucket::Meets
    }
}

/// Direction of a price move, `None` when flat
pub fn resolve_direction(return_pct: f64) -> Option<Direction> {
    if return_pct > FLAT_RETURN_THRESHOLD {
        Some(Direction::Up)
    } else if return_pct < -FLAT_RETURN_THRESHOLD {
        Some(Direction::Down)
    } else {
        None
    }
}

/// Payout a wager would receive once `winner` is known
pub fn realized_payout(odds: &ComputedOdds, wager: &Wager, winner: OutcomeBucket) -> Money {
    match wager.bucket {
        Some(bucket) if bucket == winner => compute_payout(odds, Some(bucket), wager.amount),
        _ => 0.0,
    }
}
