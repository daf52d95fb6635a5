// Stake checks kept apart from the payout arithmetic

use crate::types::Money;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StakeError {
    #[error("stake must be a finite number")]
    NotFinite,
    #[error("stake {amount:.2} is below the minimum of {min:.2}")]
    BelowMinimum { amount: Money, min: Money },
    #[error("stake {amount:.2} exceeds available balance {available:.2}")]
    InsufficientBalance { amount: Money, available: Money },
}

pub fn validate_stake(amount: Money, min_stake: Money, available: Money) -> Result<(), StakeError> {
    if !amount.is_finite() {
        return Err(StakeError::NotFinite);
    }
    if amount < min_stake {
        return Err(StakeError::BelowMinimum { amount, min: min_stake });
    }
    if amount > available {
        return Err(StakeError::InsufficientBalance { amount, available });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_is_inclusive() {
        assert!(validate_stake(10.0, 10.0, 100.0).is_ok());
        assert_eq!(
            validate_stake(9.99, 10.0, 100.0),
            Err(StakeError::BelowMinimum { amount: 9.99, min: 10.0 })
        );
    }

    #[test]
    fn test_rejects_non_positive_and_nan() {
        assert!(matches!(validate_stake(0.0, 10.0, 100.0), Err(StakeError::BelowMinimum { .. })));
        assert!(matches!(validate_stake(-50.0, 10.0, 100.0), Err(StakeError::BelowMinimum { .. })));
        assert_eq!(validate_stake(f64::NAN, 10.0, 100.0), Err(StakeError::NotFinite));
    }

    #[test]
    fn test_balance_cap() {
        let err = validate_stake(500.0, 10.0, 450.0).unwrap_err();
        assert_eq!(err.to_string(), "stake 500.00 exceeds available balance 450.00");
    }
}
