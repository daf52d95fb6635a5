// Fixed-odds OVER/UNDER panel

use crate::calculations::odds::round_to;
use crate::types::{Direction, Money};
use serde::{Deserialize, Serialize};

/// Flat multiplier shown on the binary panel, regardless of direction
pub const BINARY_MULTIPLIER: f64 = 1.85;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BinaryQuote {
    pub direction: Direction,
    pub amount: Money,
    pub multiplier: f64,
    pub payout: Money,
    pub potential_gain: Money,
}

pub fn binary_quote(direction: Direction, amount: Money) -> BinaryQuote {
    BinaryQuote {
        direction,
        amount,
        multiplier: BINARY_MULTIPLIER,
        payout: round_to(amount * BINARY_MULTIPLIER, 2),
        potential_gain: round_to(amount * (BINARY_MULTIPLIER - 1.0), 2),
    }
}
